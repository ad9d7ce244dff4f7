//! Frame driver: one engine tick per display frame

use crate::clock::FrameClock;
use crate::command::Command;
use crate::fps::FpsCounter;
use crate::render::RenderSink;
use canvasbench_core::{Result, SimError};
use canvasbench_sim::SimulationEngine;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lifecycle of a [`FrameDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
    /// A fatal error stopped the loop; it cannot be restarted
    Halted,
}

/// What a call to [`FrameDriver::frame`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The engine advanced by `dt` and the snapshot went to the renderer
    Advanced { dt: f32, active: usize },
    /// The driver is not running; nothing happened
    Skipped,
}

/// Observable per-frame metrics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameMetrics {
    pub fps: f32,
    /// Wall time of the last engine tick
    pub last_tick_ms: f32,
    pub active_count: usize,
    pub frames: u64,
}

/// Totals from [`FrameDriver::run_fixed`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub simulated_seconds: f64,
    pub avg_tick_ms: f64,
    pub max_tick_ms: f32,
    pub peak_active: usize,
    pub final_active: usize,
    pub final_fps: f32,
}

/// Cloneable flag that stops a driver from outside its frame loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn rearm(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives a [`SimulationEngine`] from frame timestamps and hands each
/// snapshot to a [`RenderSink`].
///
/// Each `frame` call runs at most one tick. Once stopped, no tick runs until
/// `start` is called again. A fatal error halts the driver for good.
pub struct FrameDriver<R: RenderSink> {
    engine: SimulationEngine,
    renderer: R,
    clock: FrameClock,
    fps: FpsCounter,
    metrics: FrameMetrics,
    state: DriverState,
    stop: StopHandle,
}

impl<R: RenderSink> FrameDriver<R> {
    pub fn new(engine: SimulationEngine, renderer: R) -> Self {
        Self {
            engine,
            renderer,
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
            metrics: FrameMetrics::default(),
            state: DriverState::Idle,
            stop: StopHandle::default(),
        }
    }

    /// Begin (or resume) ticking. The first frame after a start has a zero delta.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            DriverState::Halted => return Err(SimError::Halted),
            DriverState::Running => return Ok(()),
            DriverState::Idle | DriverState::Stopped => {}
        }
        let canvas = &self.engine.config().canvas;
        let (width, height) = (canvas.width as u32, canvas.height as u32);
        self.renderer.resize(width, height);
        self.renderer.set_capacity(self.engine.pool().capacity());
        self.clock.reset();
        self.fps.reset();
        self.stop.rearm();
        self.state = DriverState::Running;
        info!(
            "frame driver started: {} renderer, target {}",
            self.renderer.name(),
            self.engine.controller().target_count()
        );
        Ok(())
    }

    /// Stop ticking. Safe to call any number of times.
    pub fn stop(&mut self) {
        self.stop.stop();
        if self.state == DriverState::Running {
            self.state = DriverState::Stopped;
            info!("frame driver stopped after {} frames", self.metrics.frames);
        }
    }

    /// Handle that stops this driver when triggered, from any thread
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run one frame stamped `now`: tick the engine, then submit the snapshot.
    pub fn frame(&mut self, now: Instant) -> Result<FrameOutcome> {
        if self.state == DriverState::Running && self.stop.is_stopped() {
            self.stop();
        }
        if self.state != DriverState::Running {
            return Ok(FrameOutcome::Skipped);
        }

        let dt = self.clock.tick(now) as f32;
        let result = match self.engine.advance(dt) {
            Ok(snapshot) => self.renderer.submit(snapshot),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            return Err(self.halt(err));
        }

        if let Some(gap) = self.clock.frame_gap {
            self.fps.record(gap);
        }
        self.metrics = FrameMetrics {
            fps: self.fps.fps(),
            last_tick_ms: self.engine.last_update_ms(),
            active_count: self.engine.active_count(),
            frames: self.metrics.frames + 1,
        };
        Ok(FrameOutcome::Advanced {
            dt,
            active: self.metrics.active_count,
        })
    }

    fn halt(&mut self, err: SimError) -> SimError {
        error!("simulation halted: {}", err);
        self.stop.stop();
        self.state = DriverState::Halted;
        err
    }

    /// Apply a control command between frames.
    ///
    /// Rejected parameters leave the engine unchanged. Fatal errors halt the driver.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        if self.state == DriverState::Halted {
            return Err(SimError::Halted);
        }
        debug!("command {:?}", command);
        match self.execute(command) {
            Err(err) if err.is_fatal() => Err(self.halt(err)),
            other => other,
        }
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetPopulation(count) => {
                self.engine.set_population_target(count)?;
                let capacity = self.engine.sync_capacity()?;
                self.renderer.set_capacity(capacity);
            }
            Command::SetEmissionWindow(window) => self.engine.set_emission_window(window)?,
            Command::SetPolicy(policy) => self.engine.set_policy(policy),
            Command::SetMode(mode) => self.engine.set_mode(mode),
            Command::ToggleAnimation => {
                self.engine.toggle_animation();
            }
            Command::ClearAll => self.engine.clear(),
            Command::Resize { width, height } => {
                self.engine.set_canvas_size(width, height)?;
                self.renderer.resize(width as u32, height as u32);
            }
            Command::SelectArea { x1, y1, x2, y2 } => {
                self.engine.select_in_area(x1, y1, x2, y2);
            }
            Command::ClearSelection => self.engine.clear_selection(),
            Command::MoveSelected { dx, dy } => {
                self.engine.move_selected(dx, dy);
            }
            Command::DeleteSelected => {
                self.engine.delete_selected()?;
            }
            Command::SpawnBatch(batch) => {
                self.engine.spawn_batch(&batch)?;
                self.renderer.set_capacity(self.engine.pool().capacity());
            }
            Command::StressChurn {
                create,
                destroy_fraction,
            } => {
                self.engine.stress_churn(create, destroy_fraction)?;
                self.renderer.set_capacity(self.engine.pool().capacity());
            }
            Command::TrimPool => {
                self.engine.trim_pool();
                self.renderer.set_capacity(self.engine.pool().capacity());
            }
        }
        Ok(())
    }

    /// Run `frames` ticks spaced `interval` apart on a synthetic clock.
    ///
    /// Starts the driver if needed. Returns early if the driver is stopped
    /// through its [`StopHandle`].
    pub fn run_fixed(&mut self, frames: u32, interval: Duration) -> Result<RunSummary> {
        self.run_fixed_with(frames, interval, |_| {})
    }

    /// [`Self::run_fixed`], calling `on_frame` with the metrics after every tick
    pub fn run_fixed_with<F>(
        &mut self,
        frames: u32,
        interval: Duration,
        mut on_frame: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(&FrameMetrics),
    {
        self.start()?;
        let origin = Instant::now();
        let mut summary = RunSummary::default();
        let mut total_tick_ms = 0.0f64;

        // frame 0 primes the clock with a zero delta
        for i in 0..=frames {
            match self.frame(origin + interval * i)? {
                FrameOutcome::Skipped => break,
                FrameOutcome::Advanced { dt, active } => {
                    if dt > 0.0 {
                        summary.frames += 1;
                        summary.simulated_seconds += dt as f64;
                        let tick_ms = self.metrics.last_tick_ms;
                        total_tick_ms += tick_ms as f64;
                        summary.max_tick_ms = summary.max_tick_ms.max(tick_ms);
                    }
                    summary.peak_active = summary.peak_active.max(active);
                    on_frame(&self.metrics);
                }
            }
        }

        if summary.frames > 0 {
            summary.avg_tick_ms = total_tick_ms / summary.frames as f64;
        }
        summary.final_active = self.engine.active_count();
        summary.final_fps = self.metrics.fps;
        Ok(summary)
    }

    pub fn metrics(&self) -> FrameMetrics {
        self.metrics
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (SimulationEngine, R) {
        (self.engine, self.renderer)
    }
}
