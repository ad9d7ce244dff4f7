//! canvasbench Core - Foundational types for the canvasbench harness
//!
//! This crate provides the types shared by the simulation and runtime crates:
//! - `SlotId` - Stable pool slot identifiers
//! - `Vec2`, `Tint` - Spatial and color types
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{ensure_range, Result, SimError};
pub use id::SlotId;
pub use types::{Tint, Vec2, DEFAULT_PALETTE};
