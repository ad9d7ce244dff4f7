//! canvasbench Sim - pooled entity simulation core
//!
//! Owns the simulated population of a canvas benchmark:
//! - `Entity` advance with forward-Euler integration, lifetime and fade
//! - Free-list `EntityPool` that grows on demand and never drops a spawn
//! - `PopulationController` with a fractional emission accumulator
//! - `SimulationEngine` that ticks the active set and publishes a
//!   double-buffered, fixed-stride `Snapshot` keyed by stable slot ids

pub mod config;
pub mod curves;
pub mod emitter;
pub mod engine;
pub mod entity;
pub mod pool;
pub mod sampler;
pub mod snapshot;

pub use config::{
    AnimationMode, CanvasConfig, PopulationConfig, PopulationPolicy, SimConfig, SpawnConfig,
    MAX_POPULATION,
};
pub use emitter::PopulationController;
pub use engine::{sanitize_dt, ChurnReport, EngineStats, SimulationEngine};
pub use entity::{AdvanceContext, Entity, ShapeKind, VisualState};
pub use pool::{EntityPool, MAX_SLOTS};
pub use sampler::SpawnSampler;
pub use snapshot::{EntityRecord, Snapshot, RECORD_STRIDE};
