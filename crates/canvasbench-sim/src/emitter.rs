//! Population controller: how many entities to emit each tick

use crate::config::{PopulationConfig, PopulationPolicy, MAX_POPULATION};
use canvasbench_core::{ensure_range, Result, SimError};

/// Reconciles the desired population against emission over time.
///
/// In ramped mode `target_count / emission_window` entities are emitted per
/// second. The fractional remainder of each tick is carried in an accumulator
/// so that no emission is lost to rounding, whatever the frame rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationController {
    target_count: u32,
    emission_window: f32,
    policy: PopulationPolicy,
    max_spawn_per_tick: u32,
    /// Fractional emission carried between ticks, always in [0, 1)
    accumulator: f64,
}

impl PopulationController {
    pub fn new(config: &PopulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            target_count: config.target_count,
            emission_window: config.emission_window,
            policy: config.policy,
            max_spawn_per_tick: config.max_spawn_per_tick,
            accumulator: 0.0,
        })
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn emission_window(&self) -> f32 {
        self.emission_window
    }

    pub fn policy(&self) -> PopulationPolicy {
        self.policy
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Whether the deficit is filled at once instead of ramped
    pub fn is_instant(&self) -> bool {
        self.emission_window == 0.0 || self.policy == PopulationPolicy::Synchronous
    }

    /// Entities per second; infinite when emission is instant
    pub fn emission_rate(&self) -> f64 {
        if self.is_instant() {
            f64::INFINITY
        } else {
            self.target_count as f64 / self.emission_window as f64
        }
    }

    /// Update the desired population and emission window.
    ///
    /// Takes effect on the next spawn computation. Invalid values are rejected
    /// and the previous settings are kept.
    pub fn set_target(&mut self, count: u32, window: f32) -> Result<()> {
        ensure_range("target_count", count as f64, 0.0, MAX_POPULATION as f64)?;
        ensure_range("emission_window", window as f64, 0.0, f32::MAX as f64)?;
        self.target_count = count;
        self.emission_window = window;
        Ok(())
    }

    pub fn set_target_count(&mut self, count: u32) -> Result<()> {
        self.set_target(count, self.emission_window)
    }

    pub fn set_policy(&mut self, policy: PopulationPolicy) {
        self.policy = policy;
    }

    pub fn set_max_spawn_per_tick(&mut self, cap: u32) -> Result<()> {
        if cap == 0 {
            return Err(SimError::InvalidConfig(
                "max_spawn_per_tick must be at least 1".into(),
            ));
        }
        self.max_spawn_per_tick = cap;
        Ok(())
    }

    pub fn reset_accumulator(&mut self) {
        self.accumulator = 0.0;
    }

    /// Spawn count for a tick of `dt` seconds, and the accumulator value that
    /// committing it would leave behind. Does not mutate.
    pub fn plan_spawn_count(&self, dt: f32) -> (u32, f64) {
        if !(dt > 0.0 && dt.is_finite()) {
            return (0, self.accumulator);
        }
        if self.is_instant() {
            return (self.max_spawn_per_tick, 0.0);
        }
        let acc = self.accumulator + self.emission_rate() * dt as f64;
        let whole = acc.floor();
        let count = whole.min(self.max_spawn_per_tick as f64) as u32;
        (count, acc - whole)
    }

    /// Advance the accumulator by `dt` and return the whole entities due.
    pub fn compute_spawn_count(&mut self, dt: f32) -> u32 {
        let (count, accumulator) = self.plan_spawn_count(dt);
        self.accumulator = accumulator;
        count
    }

    /// Emission due this tick, limited so the population never exceeds the target.
    pub fn plan_spawn_budget(&self, dt: f32, active: usize) -> (u32, f64) {
        let (count, accumulator) = self.plan_spawn_count(dt);
        let deficit = (self.target_count as usize).saturating_sub(active);
        (count.min(deficit.min(u32::MAX as usize) as u32), accumulator)
    }

    pub fn spawn_budget(&mut self, dt: f32, active: usize) -> u32 {
        let (count, accumulator) = self.plan_spawn_budget(dt, active);
        self.accumulator = accumulator;
        count
    }

    pub(crate) fn commit_accumulator(&mut self, accumulator: f64) {
        self.accumulator = accumulator;
    }
}
