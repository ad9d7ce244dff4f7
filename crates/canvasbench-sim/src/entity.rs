//! A single simulated unit: canvas shape or particle

use crate::config::{AnimationMode, SpawnConfig};
use crate::curves::{fade_alpha, oscillate, wrap_angle};
use crate::sampler::SpawnSampler;
use canvasbench_core::{Tint, Vec2};
use serde::{Deserialize, Serialize};

/// Age tolerance when comparing against lifetime, absorbs f32 accumulation error
pub const LIFETIME_EPSILON: f32 = 1e-5;

const ROTATING_SPEED: f32 = 0.5;
const STRESS_ROTATION_SPEED: f32 = 0.3;
const STRESS_ORBIT_RADIUS: f32 = 20.0;

/// What the renderer draws for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ShapeKind {
    #[default]
    Rectangle = 0,
    Circle = 1,
    ComplexPath = 2,
    Text = 3,
    Particle = 4,
}

impl ShapeKind {
    pub fn as_f32(self) -> f32 {
        self as u8 as f32
    }
}

/// Render-facing state derived every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub size: f32,
    /// Scale assigned at spawn; animation modes modulate around it
    pub base_scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub alpha: f32,
    pub tint: Tint,
}

impl VisualState {
    const EMPTY: Self = Self {
        size: 0.0,
        base_scale: 0.0,
        scale_x: 0.0,
        scale_y: 0.0,
        rotation: 0.0,
        alpha: 0.0,
        tint: Tint(0),
    };
}

/// Per-tick inputs shared by every entity
#[derive(Debug, Clone, Copy)]
pub struct AdvanceContext {
    pub mode: AnimationMode,
    /// Simulation time at the end of this tick, in seconds
    pub time: f32,
    pub gravity: Vec2,
    pub radial_acceleration: f32,
    pub origin: Vec2,
    pub kill_radius: Option<f32>,
}

impl AdvanceContext {
    pub fn from_spawn(spawn: &SpawnConfig, mode: AnimationMode, time: f32) -> Self {
        Self {
            mode,
            time,
            gravity: spawn.gravity,
            radial_acceleration: spawn.radial_acceleration,
            origin: spawn.origin(),
            kill_radius: spawn.kill_radius,
        }
    }
}

/// One pooled simulation slot
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Rendered position
    pub position: Vec2,
    pub velocity: Vec2,
    /// Integrated base position; `position` equals it except while orbiting in stress mode
    pub anchor: Vec2,
    pub age: f32,
    pub lifetime: f32,
    /// Per-entity offset for oscillating modes
    pub phase: f32,
    pub shape: ShapeKind,
    pub visual: VisualState,
    pub selected: bool,
    pub active: bool,
}

impl Entity {
    /// A zeroed, inactive slot as created at pool warm-up
    pub fn idle() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            anchor: Vec2::ZERO,
            age: 0.0,
            lifetime: 0.0,
            phase: 0.0,
            shape: ShapeKind::Rectangle,
            visual: VisualState::EMPTY,
            selected: false,
            active: false,
        }
    }

    /// Re-initialize every mutable field from the spawn config and activate the slot.
    pub fn reset(&mut self, config: &SpawnConfig, sampler: &mut SpawnSampler) {
        let position = sampler.point_in_rect(config.region_min, config.region_max);
        let speed = sampler.range(config.speed_min, config.speed_max);
        let direction = sampler.direction(config.direction, config.spread);
        let base_scale = sampler.range(config.scale_min, config.scale_max);

        self.position = position;
        self.anchor = position;
        self.velocity = direction * speed;
        self.age = 0.0;
        self.lifetime = sampler.range(config.lifetime_min, config.lifetime_max);
        self.phase = sampler.range(0.0, std::f32::consts::TAU);
        self.shape = sampler.pick(&config.shapes).copied().unwrap_or_default();
        self.visual = VisualState {
            size: sampler.range(config.size_min, config.size_max),
            base_scale,
            scale_x: base_scale,
            scale_y: base_scale,
            rotation: 0.0,
            alpha: 1.0,
            tint: sampler.pick(&config.palette).copied().unwrap_or(Tint::WHITE),
        };
        self.selected = false;
        self.active = true;
    }

    /// Normalized age in [0, 1]; always 0 for entities that never expire
    pub fn age_ratio(&self) -> f32 {
        if self.lifetime.is_infinite() {
            0.0
        } else if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).min(1.0)
        }
    }

    /// Liveness without advancing
    pub fn is_alive(&self, ctx: &AdvanceContext) -> bool {
        if !self.active || self.lifetime - self.age <= LIFETIME_EPSILON {
            return false;
        }
        match ctx.kill_radius {
            Some(radius) => (self.anchor - ctx.origin).length() <= radius,
            None => true,
        }
    }

    /// Integrate one step of `dt` seconds and return whether the entity is still alive.
    ///
    /// Non-positive or non-finite `dt` leaves the entity untouched. An entity
    /// that expires is marked inactive before returning `false`.
    pub fn advance(&mut self, dt: f32, ctx: &AdvanceContext) -> bool {
        if !self.active {
            return false;
        }
        if !(dt > 0.0 && dt.is_finite()) {
            return self.is_alive(ctx);
        }

        // Forward Euler: forces, velocity, then position
        let mut acceleration = ctx.gravity;
        if ctx.radial_acceleration != 0.0 {
            acceleration += (self.anchor - ctx.origin).normalized() * ctx.radial_acceleration;
        }
        self.velocity += acceleration * dt;
        self.anchor += self.velocity * dt;
        self.age += dt;

        self.apply_mode(dt, ctx);
        self.visual.alpha = fade_alpha(self.age, self.lifetime);

        let alive = self.is_alive(ctx);
        if !alive {
            self.active = false;
        }
        alive
    }

    fn apply_mode(&mut self, dt: f32, ctx: &AdvanceContext) {
        let base = self.visual.base_scale;
        let mut position = self.anchor;
        let scale = match ctx.mode {
            AnimationMode::Static | AnimationMode::Interactive => base,
            AnimationMode::Rotating => {
                self.visual.rotation = wrap_angle(self.visual.rotation + ROTATING_SPEED * dt);
                base
            }
            AnimationMode::Scaling => base * oscillate(0.5, 0.3, ctx.time + self.phase),
            AnimationMode::Stress => {
                self.visual.rotation =
                    wrap_angle(self.visual.rotation + STRESS_ROTATION_SPEED * dt);
                let angle = ctx.time * 0.5 + self.phase * 2.0;
                position += Vec2::from_angle(angle) * STRESS_ORBIT_RADIUS;
                base * oscillate(0.4, 0.2, ctx.time + self.phase)
            }
        };
        self.position = position;
        self.visual.scale_x = scale;
        self.visual.scale_y = scale;
    }

    /// Translate the entity, keeping its top-left corner on the canvas
    pub fn translate_clamped(&mut self, delta: Vec2, width: f32, height: f32) {
        let max_x = (width - self.visual.size).max(0.0);
        let max_y = (height - self.visual.size).max(0.0);
        let target = self.anchor + delta;
        let clamped = Vec2::new(target.x.clamp(0.0, max_x), target.y.clamp(0.0, max_y));
        let applied = clamped - self.anchor;
        self.anchor = clamped;
        self.position += applied;
    }
}
