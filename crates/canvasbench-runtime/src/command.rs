//! Commands from the control surface

use canvasbench_sim::{AnimationMode, PopulationPolicy, ShapeKind};

/// A user or benchmark command, applied between frames by
/// [`FrameDriver::apply`](crate::FrameDriver::apply).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Change the desired population; capacity follows
    SetPopulation(u32),
    SetEmissionWindow(f32),
    SetPolicy(PopulationPolicy),
    SetMode(AnimationMode),
    /// Pause or resume animation, remembering the previous mode
    ToggleAnimation,
    /// Release every entity and restart emission from zero
    ClearAll,
    Resize {
        width: f32,
        height: f32,
    },
    SelectArea {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    ClearSelection,
    MoveSelected {
        dx: f32,
        dy: f32,
    },
    DeleteSelected,
    /// Spawn fixed counts of given shapes right away
    SpawnBatch(Vec<(ShapeKind, u32)>),
    /// Release a fraction of the population and spawn replacements
    StressChurn {
        create: u32,
        destroy_fraction: f32,
    },
    /// Drop idle pool slots above what the target needs
    TrimPool,
}
