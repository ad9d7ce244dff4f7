//! Simulation engine: owns the active set, advances it, and publishes snapshots

use crate::config::{AnimationMode, CanvasConfig, PopulationPolicy, SimConfig, MAX_POPULATION};
use crate::emitter::PopulationController;
use crate::entity::{AdvanceContext, Entity, ShapeKind};
use crate::pool::EntityPool;
use crate::sampler::SpawnSampler;
use crate::snapshot::{EntityRecord, Snapshot, SnapshotBuffers};
use canvasbench_core::{ensure_range, Result, SimError, SlotId, Vec2};
use log::{debug, info};
use std::time::Instant;

/// Read-only counters for the metrics surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineStats {
    pub active: usize,
    pub selected: usize,
    pub target: u32,
    pub capacity: usize,
    pub idle: usize,
    pub tick: u64,
    pub time: f64,
    pub last_update_ms: f32,
    pub memory_bytes: usize,
}

/// Outcome of [`SimulationEngine::stress_churn`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChurnReport {
    pub created: usize,
    pub destroyed: usize,
}

/// Turns a raw frame delta into a usable one: negative, NaN and infinite
/// deltas become 0.
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Owns the pool, the population controller and the snapshot buffers.
///
/// All mutation goes through `advance`, the population setters, `clear` and
/// the selection commands. Slots move `Idle -> Active -> Idle`; the active
/// list keeps spawn order, and each snapshot record carries the slot id, so a
/// retired entity never shifts the identity of another.
pub struct SimulationEngine {
    config: SimConfig,
    pool: EntityPool,
    controller: PopulationController,
    active: Vec<SlotId>,
    /// Scratch list of slots to retire this tick
    retired: Vec<SlotId>,
    snapshots: SnapshotBuffers,
    sampler: SpawnSampler,
    mode: AnimationMode,
    /// Mode restored when `toggle_animation` leaves `Static`
    resume_mode: AnimationMode,
    time: f64,
    tick: u64,
    last_update_ms: f32,
}

impl SimulationEngine {
    /// Build an engine around an explicit sampler. The pool is warmed up to
    /// the configured target so the first ticks do not allocate.
    pub fn new(config: SimConfig, sampler: SpawnSampler) -> Result<Self> {
        config.validate()?;
        let controller = PopulationController::new(&config.population)?;
        let pool = EntityPool::with_capacity(config.population.target_count as usize)?;
        let mode = config.mode;
        Ok(Self {
            config,
            pool,
            controller,
            active: Vec::new(),
            retired: Vec::new(),
            snapshots: SnapshotBuffers::default(),
            sampler,
            mode,
            resume_mode: if mode != AnimationMode::Static {
                mode
            } else {
                AnimationMode::Rotating
            },
            time: 0.0,
            tick: 0,
            last_update_ms: 0.0,
        })
    }

    /// Build an engine seeded from `config.seed`
    pub fn from_config(config: SimConfig) -> Result<Self> {
        let sampler = SpawnSampler::new(config.seed);
        Self::new(config, sampler)
    }

    /// Advance the simulation by `dt` seconds and publish a new snapshot.
    ///
    /// Degenerate deltas are a no-op tick. The only error is an allocation
    /// failure, which is detected before anything is mutated.
    pub fn advance(&mut self, dt: f32) -> Result<&Snapshot> {
        let dt = sanitize_dt(dt);
        if dt == 0.0 {
            return Ok(self.snapshots.front());
        }
        let started = Instant::now();

        let (spawn, accumulator) = self.controller.plan_spawn_budget(dt, self.active.len());
        let spawn = spawn as usize;
        self.reserve_for(spawn)?;
        self.controller.commit_accumulator(accumulator);

        for _ in 0..spawn {
            self.spawn_one(None)?;
        }

        self.time += dt as f64;
        let ctx = AdvanceContext::from_spawn(&self.config.spawn, self.mode, self.time as f32);
        for &id in &self.active {
            if let Some(entity) = self.pool.get_mut(id) {
                if !entity.advance(dt, &ctx) {
                    self.retired.push(id);
                }
            }
        }

        self.trim_to_target();
        self.retire_queued();

        self.tick += 1;
        self.publish();
        self.last_update_ms = started.elapsed().as_secs_f32() * 1000.0;
        Ok(self.snapshots.front())
    }

    /// Reserve everything a tick spawning `spawn` entities could allocate.
    fn reserve_for(&mut self, spawn: usize) -> Result<()> {
        let total = self.active.len() + spawn;
        self.pool
            .reserve(spawn.saturating_sub(self.pool.idle_count()))?;
        self.active
            .try_reserve(spawn)
            .map_err(|_| SimError::Allocation { requested: spawn })?;
        self.retired.clear();
        self.retired
            .try_reserve(total)
            .map_err(|_| SimError::Allocation { requested: total })?;
        self.snapshots.reserve_back(total)
    }

    fn spawn_one(&mut self, shape: Option<ShapeKind>) -> Result<SlotId> {
        let id = self.pool.acquire()?;
        if let Some(entity) = self.pool.get_mut(id) {
            entity.reset(&self.config.spawn, &mut self.sampler);
            if let Some(shape) = shape {
                entity.shape = shape;
            }
        }
        self.active.push(id);
        Ok(id)
    }

    /// Queue the oldest live entities above the target for retirement.
    fn trim_to_target(&mut self) {
        let live = self.active.len() - self.retired.len();
        let mut excess = live.saturating_sub(self.controller.target_count() as usize);
        if excess == 0 {
            return;
        }
        debug!("trimming {} entities above target", excess);
        for &id in &self.active {
            if excess == 0 {
                break;
            }
            if let Some(entity) = self.pool.get_mut(id) {
                if entity.active {
                    entity.active = false;
                    self.retired.push(id);
                    excess -= 1;
                }
            }
        }
    }

    fn retire_queued(&mut self) {
        if self.retired.is_empty() {
            return;
        }
        for &id in &self.retired {
            self.pool.release(id);
        }
        let pool = &self.pool;
        self.active.retain(|id| pool.is_in_use(*id));
        self.retired.clear();
    }

    fn publish(&mut self) {
        let pool = &self.pool;
        let records = self
            .active
            .iter()
            .filter_map(|&id| pool.get(id).map(|e| EntityRecord::from_entity(id, e)));
        self.snapshots.publish(self.tick, records);
    }

    /// Publish the current state outside a tick, after a structural change
    fn republish(&mut self) -> Result<()> {
        self.snapshots.reserve_back(self.active.len())?;
        self.publish();
        Ok(())
    }

    /// Release every active entity, empty the snapshot and zero the emission
    /// accumulator. Emission resumes from scratch on the next tick.
    pub fn clear(&mut self) {
        let released = self.active.len();
        for id in self.active.drain(..) {
            self.pool.release(id);
        }
        self.retired.clear();
        self.snapshots.clear();
        self.controller.reset_accumulator();
        info!("cleared {} entities", released);
    }

    // ── Population control ──

    /// Change the desired population. Emission ramps toward it from the next
    /// tick on; call [`Self::sync_capacity`] separately to grow the pool.
    pub fn set_population_target(&mut self, count: u32) -> Result<()> {
        self.controller.set_target_count(count)?;
        debug!(
            "population target {} over {}s",
            count,
            self.controller.emission_window()
        );
        Ok(())
    }

    pub fn set_emission_window(&mut self, window: f32) -> Result<()> {
        self.controller
            .set_target(self.controller.target_count(), window)
    }

    pub fn set_policy(&mut self, policy: PopulationPolicy) {
        self.controller.set_policy(policy);
    }

    /// Grow the pool to the current target. Returns the resulting capacity.
    pub fn sync_capacity(&mut self) -> Result<usize> {
        self.pool
            .warm_up(self.controller.target_count() as usize)?;
        Ok(self.pool.capacity())
    }

    pub fn warm_up(&mut self, capacity: usize) -> Result<()> {
        self.pool.warm_up(capacity)
    }

    /// Explicit shrink of idle pool slots down toward the target
    pub fn trim_pool(&mut self) -> usize {
        let keep = (self.controller.target_count() as usize).max(self.active.len());
        let dropped = self.pool.trim(keep);
        if dropped > 0 {
            debug!("trimmed {} idle slots", dropped);
        }
        dropped
    }

    /// Immediately create a mixed batch of shapes, bypassing emission. The
    /// target grows by the batch size so the new entities are kept.
    pub fn spawn_batch(&mut self, batch: &[(ShapeKind, u32)]) -> Result<usize> {
        let total: usize = batch.iter().map(|(_, count)| *count as usize).sum();
        let target = self.controller.target_count() as usize + total;
        let target = u32::try_from(target).map_err(|_| {
            SimError::InvalidConfig(format!("batch of {} exceeds the population limit", total))
        })?;
        let mut controller = self.controller.clone();
        controller.set_target_count(target)?;
        self.reserve_for(total)?;
        self.controller = controller;

        for &(shape, count) in batch {
            for _ in 0..count {
                self.spawn_one(Some(shape))?;
            }
        }
        self.republish()?;
        debug!("spawned batch of {}", total);
        Ok(total)
    }

    /// Memory stress: create `create` rectangles, then retire a random
    /// `destroy_fraction` of the whole active set. The target is unchanged,
    /// so the next ticks trim the excess or re-emit the deficit.
    pub fn stress_churn(&mut self, create: u32, destroy_fraction: f32) -> Result<ChurnReport> {
        ensure_range("destroy_fraction", destroy_fraction as f64, 0.0, 1.0)?;
        ensure_range("create", create as f64, 0.0, MAX_POPULATION as f64)?;
        let create = create as usize;
        self.reserve_for(create)?;
        for _ in 0..create {
            self.spawn_one(Some(ShapeKind::Rectangle))?;
        }

        let destroy = (self.active.len() as f32 * destroy_fraction) as usize;
        for index in self.sampler.sample_indices(self.active.len(), destroy) {
            self.pool.release(self.active[index]);
        }
        let pool = &self.pool;
        self.active.retain(|id| pool.is_in_use(*id));
        self.republish()?;

        Ok(ChurnReport {
            created: create,
            destroyed: destroy,
        })
    }

    // ── Modes and canvas ──

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AnimationMode) {
        if mode != AnimationMode::Static {
            self.resume_mode = mode;
        }
        self.mode = mode;
    }

    /// Pause into `Static`, or return to the mode that was paused
    pub fn toggle_animation(&mut self) -> AnimationMode {
        if self.mode == AnimationMode::Static {
            self.mode = self.resume_mode;
        } else {
            self.resume_mode = self.mode;
            self.mode = AnimationMode::Static;
        }
        self.mode
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) -> Result<()> {
        let canvas = CanvasConfig { width, height };
        canvas.validate()?;
        self.config.canvas = canvas;
        Ok(())
    }

    // ── Interactive selection ──

    /// Select every active entity whose position lies in the rectangle spanned
    /// by the two corners.
    pub fn select_in_area(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<SlotId> {
        let (min_x, max_x) = (x1.min(x2), x1.max(x2));
        let (min_y, max_y) = (y1.min(y2), y1.max(y2));
        let mut selected = Vec::new();
        for &id in &self.active {
            if let Some(entity) = self.pool.get_mut(id) {
                let p = entity.position;
                if p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y {
                    entity.selected = true;
                    selected.push(id);
                }
            }
        }
        selected
    }

    pub fn clear_selection(&mut self) {
        for &id in &self.active {
            if let Some(entity) = self.pool.get_mut(id) {
                entity.selected = false;
            }
        }
    }

    /// Move selected entities, keeping them on the canvas. Returns how many moved.
    pub fn move_selected(&mut self, dx: f32, dy: f32) -> usize {
        if !(dx.is_finite() && dy.is_finite()) {
            return 0;
        }
        let CanvasConfig { width, height } = self.config.canvas;
        let mut moved = 0;
        for &id in &self.active {
            if let Some(entity) = self.pool.get_mut(id) {
                if entity.selected {
                    entity.translate_clamped(Vec2::new(dx, dy), width, height);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Retire selected entities. The target shrinks by the same amount so
    /// they are not re-emitted.
    pub fn delete_selected(&mut self) -> Result<usize> {
        let mut deleted = 0;
        for &id in &self.active {
            if self.pool.get(id).is_some_and(|e| e.selected) {
                self.pool.release(id);
                deleted += 1;
            }
        }
        if deleted == 0 {
            return Ok(0);
        }
        let pool = &self.pool;
        self.active.retain(|id| pool.is_in_use(*id));
        let target = (self.controller.target_count() as usize).saturating_sub(deleted);
        self.controller.set_target_count(target as u32)?;
        self.republish()?;
        Ok(deleted)
    }

    // ── Read access ──

    /// The last published snapshot
    pub fn snapshot(&self) -> &Snapshot {
        self.snapshots.front()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active slots in spawn order
    pub fn active_ids(&self) -> &[SlotId] {
        &self.active
    }

    /// The entity in `id`, if that slot is currently active
    pub fn entity(&self, id: SlotId) -> Option<&Entity> {
        if self.pool.is_in_use(id) {
            self.pool.get(id)
        } else {
            None
        }
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn controller(&self) -> &PopulationController {
        &self.controller
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulated seconds since the engine was created
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn last_update_ms(&self) -> f32 {
        self.last_update_ms
    }

    pub fn stats(&self) -> EngineStats {
        let selected = self
            .active
            .iter()
            .filter(|&&id| self.pool.get(id).is_some_and(|e| e.selected))
            .count();
        EngineStats {
            active: self.active.len(),
            selected,
            target: self.controller.target_count(),
            capacity: self.pool.capacity(),
            idle: self.pool.idle_count(),
            tick: self.tick,
            time: self.time,
            last_update_ms: self.last_update_ms,
            memory_bytes: self.pool.memory_bytes()
                + self.snapshots.memory_bytes()
                + self.active.capacity() * std::mem::size_of::<SlotId>(),
        }
    }
}
