//! canvasbench Runtime - frame loop infrastructure
//!
//! Provides the pieces between the display refresh and the simulation:
//! - `FrameClock`: per-frame delta with a stall clamp
//! - `FpsCounter`: reset-every-second frame rate estimate
//! - `FrameDriver`: advances the engine once per frame and feeds the renderer
//! - `RenderSink`: trait the external renderer implements
//! - `Command`: control-surface commands applied between frames

mod clock;
mod command;
mod driver;
mod fps;
mod render;

pub use clock::{FrameClock, MAX_FRAME_DELTA};
pub use command::Command;
pub use driver::{DriverState, FrameDriver, FrameMetrics, FrameOutcome, RunSummary, StopHandle};
pub use fps::FpsCounter;
pub use render::{NullRenderer, RenderSink, RetainedRenderer};
