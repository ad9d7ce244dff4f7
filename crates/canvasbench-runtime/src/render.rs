//! Renderer binding

use canvasbench_core::{Result, SlotId};
use canvasbench_sim::{EntityRecord, Snapshot};
use log::trace;
use std::collections::{HashMap, HashSet};

/// The external renderer the frame driver feeds.
///
/// `submit` receives each published snapshot exactly once, after the engine
/// has finished the tick. Implementations should key any per-entity state by
/// `EntityRecord::slot_id`, never by position in the record slice.
pub trait RenderSink {
    /// The drawing surface changed size
    fn resize(&mut self, width: u32, height: u32);

    /// The engine's pool capacity changed; pre-size per-entity storage
    fn set_capacity(&mut self, capacity: usize);

    /// Draw one snapshot
    fn submit(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Discards everything. Used for headless benchmarking.
#[derive(Debug, Default)]
pub struct NullRenderer {
    submitted: u64,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl RenderSink for NullRenderer {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn set_capacity(&mut self, _capacity: usize) {}

    fn submit(&mut self, _snapshot: &Snapshot) -> Result<()> {
        self.submitted += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Models a retained-mode scene: one visual handle per live slot id, created
/// when the id first appears and destroyed when it drops out of a snapshot.
#[derive(Debug, Default)]
pub struct RetainedRenderer {
    handles: HashMap<SlotId, EntityRecord>,
    width: u32,
    height: u32,
    capacity: usize,
    created: u64,
    destroyed: u64,
    frames: u64,
    last_tick: u64,
}

impl RetainedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, id: SlotId) -> Option<&EntityRecord> {
        self.handles.get(&id)
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_tick(&self) -> u64 {
        self.last_tick
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl RenderSink for RetainedRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.handles.reserve(capacity.saturating_sub(self.handles.len()));
    }

    fn submit(&mut self, snapshot: &Snapshot) -> Result<()> {
        let before = self.handles.len();
        let mut updated = 0usize;
        for record in snapshot.records() {
            if self.handles.insert(record.slot_id(), *record).is_some() {
                updated += 1;
            } else {
                self.created += 1;
            }
        }
        // anything not refreshed this frame has left the scene
        if updated < before {
            let live: HashSet<SlotId> = snapshot.records().iter().map(|r| r.slot_id()).collect();
            let stale = self.handles.len() - live.len();
            self.handles.retain(|id, _| live.contains(id));
            self.destroyed += stale as u64;
            trace!("tick {}: {} handles removed", snapshot.tick(), stale);
        }
        self.frames += 1;
        self.last_tick = snapshot.tick();
        Ok(())
    }

    fn name(&self) -> &str {
        "retained"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvasbench_sim::{SimConfig, SimulationEngine};

    #[test]
    fn null_renderer_counts_frames() {
        let mut renderer = NullRenderer::new();
        renderer.submit(&Snapshot::default()).unwrap();
        renderer.submit(&Snapshot::default()).unwrap();
        assert_eq!(renderer.submitted(), 2);
    }

    #[test]
    fn retained_handles_follow_slot_ids() {
        let mut config = SimConfig::canvas_shapes();
        config.population.target_count = 20;
        config.population.emission_window = 0.0;
        let mut engine = SimulationEngine::from_config(config).unwrap();
        let mut renderer = RetainedRenderer::new();

        renderer.submit(engine.advance(0.016).unwrap()).unwrap();
        assert_eq!(renderer.handle_count(), 20);
        assert_eq!(renderer.created(), 20);

        engine.set_population_target(15).unwrap();
        renderer.submit(engine.advance(0.016).unwrap()).unwrap();
        assert_eq!(renderer.handle_count(), 15);
        assert_eq!(renderer.destroyed(), 5);
        assert_eq!(renderer.created(), 20);
        for id in engine.active_ids() {
            assert!(renderer.handle(*id).is_some());
        }
    }
}
