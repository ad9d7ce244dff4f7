//! Simulation configuration (parsed from TOML) and presets

use crate::entity::ShapeKind;
use canvasbench_core::{ensure_range, Result, SimError, Tint, Vec2, DEFAULT_PALETTE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Upper bound on the population target accepted from the control surface
pub const MAX_POPULATION: u32 = 10_000_000;

/// How active entities are animated each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    #[default]
    Static,
    Rotating,
    Scaling,
    Interactive,
    Stress,
}

impl AnimationMode {
    pub const ALL: [AnimationMode; 5] = [
        AnimationMode::Static,
        AnimationMode::Rotating,
        AnimationMode::Scaling,
        AnimationMode::Interactive,
        AnimationMode::Stress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationMode::Static => "static",
            AnimationMode::Rotating => "rotating",
            AnimationMode::Scaling => "scaling",
            AnimationMode::Interactive => "interactive",
            AnimationMode::Stress => "stress",
        }
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        AnimationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                SimError::InvalidConfig(format!(
                    "unknown mode '{}'; valid values: static, rotating, scaling, interactive, stress",
                    s
                ))
            })
    }
}

/// How the population reacts to a change of the target count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationPolicy {
    /// New entities are emitted at `target / window` per second.
    #[default]
    Ramped,
    /// The whole deficit is refilled on the next tick, up to the per-tick cap.
    Synchronous,
}

/// `[population]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub target_count: u32,
    /// Seconds over which `target_count` entities are emitted. Zero means instant.
    pub emission_window: f32,
    pub policy: PopulationPolicy,
    /// Cap on entities created in a single tick by instant emission
    pub max_spawn_per_tick: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            target_count: 1000,
            emission_window: 5.0,
            policy: PopulationPolicy::Ramped,
            max_spawn_per_tick: 10_000,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_range(
            "population.target_count",
            self.target_count as f64,
            0.0,
            MAX_POPULATION as f64,
        )?;
        ensure_range(
            "population.emission_window",
            self.emission_window as f64,
            0.0,
            f32::MAX as f64,
        )?;
        if self.max_spawn_per_tick == 0 {
            return Err(SimError::InvalidConfig(
                "population.max_spawn_per_tick must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `[spawn]` section: everything `Entity::reset` randomizes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub region_min: Vec2,
    pub region_max: Vec2,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Base emission direction in degrees (0 = +x, 90 = +y)
    pub direction: f32,
    /// Half-angle around `direction` in degrees; 180 or more is omnidirectional
    pub spread: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Lifetime range in seconds; `inf` for shapes that never expire
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub gravity: Vec2,
    /// Acceleration pushing entities away from the center of the spawn region
    pub radial_acceleration: f32,
    /// Entities farther than this from the center of the spawn region expire
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_radius: Option<f32>,
    pub palette: Vec<Tint>,
    pub shapes: Vec<ShapeKind>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self::shapes_for_canvas(&CanvasConfig::default())
    }
}

impl SpawnConfig {
    /// Static canvas shapes scattered over the canvas
    pub fn shapes_for_canvas(canvas: &CanvasConfig) -> Self {
        Self {
            region_min: Vec2::new(50.0, 50.0),
            region_max: Vec2::new(
                (canvas.width - 100.0).max(50.0),
                (canvas.height - 100.0).max(50.0),
            ),
            speed_min: 0.0,
            speed_max: 0.0,
            direction: 0.0,
            spread: 180.0,
            size_min: 30.0,
            size_max: 80.0,
            scale_min: 0.5,
            scale_max: 1.5,
            lifetime_min: f32::INFINITY,
            lifetime_max: f32::INFINITY,
            gravity: Vec2::ZERO,
            radial_acceleration: 0.0,
            kill_radius: None,
            palette: DEFAULT_PALETTE.to_vec(),
            shapes: vec![ShapeKind::Rectangle, ShapeKind::Circle],
        }
    }

    /// Particles shot upward from the bottom center of the canvas
    pub fn fountain_for_canvas(canvas: &CanvasConfig) -> Self {
        let nozzle = Vec2::new(canvas.width * 0.5, canvas.height - 40.0);
        Self {
            region_min: nozzle - Vec2::new(4.0, 0.0),
            region_max: nozzle + Vec2::new(4.0, 0.0),
            speed_min: 450.0,
            speed_max: 650.0,
            direction: -90.0,
            spread: 20.0,
            size_min: 2.0,
            size_max: 5.0,
            scale_min: 1.0,
            scale_max: 1.0,
            lifetime_min: 4.0,
            lifetime_max: 6.0,
            gravity: Vec2::new(0.0, 220.0),
            radial_acceleration: 0.0,
            kill_radius: None,
            palette: DEFAULT_PALETTE.to_vec(),
            shapes: vec![ShapeKind::Particle],
        }
    }

    /// Center of the spawn region, used as the origin for radial forces
    pub fn origin(&self) -> Vec2 {
        (self.region_min + self.region_max) * 0.5
    }

    pub fn validate(&self) -> Result<()> {
        let span = self.region_max - self.region_min;
        if !self.region_min.is_finite() || !self.region_max.is_finite() || !span.is_finite() {
            return Err(SimError::InvalidConfig("spawn region must be finite".into()));
        }
        if self.region_min.x > self.region_max.x || self.region_min.y > self.region_max.y {
            return Err(SimError::InvalidConfig(
                "spawn.region_min must not exceed spawn.region_max".into(),
            ));
        }
        check_span("spawn.speed", self.speed_min, self.speed_max, 0.0)?;
        check_span("spawn.size", self.size_min, self.size_max, 0.0)?;
        check_span("spawn.scale", self.scale_min, self.scale_max, 0.0)?;
        if self.lifetime_min.is_nan() || self.lifetime_max.is_nan() {
            return Err(SimError::InvalidConfig("spawn lifetime must not be NaN".into()));
        }
        if self.lifetime_min < 0.0 || self.lifetime_min > self.lifetime_max {
            return Err(SimError::InvalidConfig(format!(
                "spawn lifetime range [{}, {}] is invalid",
                self.lifetime_min, self.lifetime_max
            )));
        }
        ensure_range("spawn.direction", self.direction as f64, -360.0, 360.0)?;
        ensure_range("spawn.spread", self.spread as f64, 0.0, 360.0)?;
        if !self.gravity.is_finite() || !self.radial_acceleration.is_finite() {
            return Err(SimError::InvalidConfig("spawn forces must be finite".into()));
        }
        if let Some(radius) = self.kill_radius {
            ensure_range("spawn.kill_radius", radius as f64, 0.0, f32::MAX as f64)?;
        }
        if self.palette.is_empty() {
            return Err(SimError::InvalidConfig("spawn.palette must not be empty".into()));
        }
        if self.shapes.is_empty() {
            return Err(SimError::InvalidConfig("spawn.shapes must not be empty".into()));
        }
        Ok(())
    }
}

/// `[canvas]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl CanvasConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_range("canvas.width", self.width as f64, 1.0, 65_536.0)?;
        ensure_range("canvas.height", self.height as f64, 1.0, 65_536.0)?;
        Ok(())
    }
}

/// Complete configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub mode: AnimationMode,
    pub seed: u64,
    pub population: PopulationConfig,
    pub canvas: CanvasConfig,
    pub spawn: SpawnConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::canvas_shapes()
    }
}

impl SimConfig {
    /// Long-lived canvas shapes, the default benchmark population
    pub fn canvas_shapes() -> Self {
        let canvas = CanvasConfig::default();
        Self {
            mode: AnimationMode::Static,
            seed: 0xC0FF_EE00,
            population: PopulationConfig::default(),
            spawn: SpawnConfig::shapes_for_canvas(&canvas),
            canvas,
        }
    }

    /// Short-lived particles under gravity
    pub fn fountain() -> Self {
        let canvas = CanvasConfig::default();
        Self {
            mode: AnimationMode::Static,
            seed: 0xF0_0D5EED,
            population: PopulationConfig {
                target_count: 5000,
                emission_window: 5.0,
                ..Default::default()
            },
            spawn: SpawnConfig::fountain_for_canvas(&canvas),
            canvas,
        }
    }

    /// Look up a named preset
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "shapes" => Ok(Self::canvas_shapes()),
            "fountain" => Ok(Self::fountain()),
            _ => Err(SimError::InvalidConfig(format!(
                "unknown preset '{}'; valid values: shapes, fountain",
                name
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.population.validate()?;
        self.canvas.validate()?;
        self.spawn.validate()?;
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn check_span(field: &str, min: f32, max: f32, floor: f32) -> Result<()> {
    if !(max - min).is_finite() || min < floor || min > max {
        return Err(SimError::InvalidConfig(format!(
            "{field} range [{min}, {max}] is invalid"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        SimConfig::canvas_shapes().validate().unwrap();
        SimConfig::fountain().validate().unwrap();
        assert!(SimConfig::preset("nope").is_err());
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
mode = "stress"
seed = 7

[population]
target_count = 250
emission_window = 2.5
policy = "synchronous"

[spawn]
gravity = { x = 0.0, y = -10.0 }
shapes = ["text", "complex_path"]
"#;
        let config = SimConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.mode, AnimationMode::Stress);
        assert_eq!(config.seed, 7);
        assert_eq!(config.population.target_count, 250);
        assert!((config.population.emission_window - 2.5).abs() < 1e-6);
        assert_eq!(config.population.policy, PopulationPolicy::Synchronous);
        assert!((config.spawn.gravity.y + 10.0).abs() < 1e-6);
        assert_eq!(
            config.spawn.shapes,
            vec![ShapeKind::Text, ShapeKind::ComplexPath]
        );
        // untouched sections keep their defaults
        assert_eq!(config.canvas, CanvasConfig::default());
    }

    #[test]
    fn rejects_negative_window() {
        let err = SimConfig::from_toml_str("[population]\nemission_window = -1.0\n");
        assert!(matches!(err, Err(SimError::ValueOutOfRange { .. })));
    }

    #[test]
    fn rejects_inverted_lifetime() {
        let mut config = SimConfig::fountain();
        config.spawn.lifetime_min = 5.0;
        config.spawn.lifetime_max = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_spans_that_overflow() {
        let mut config = SimConfig::canvas_shapes();
        config.spawn.region_min = Vec2::new(-3.0e38, 0.0);
        config.spawn.region_max = Vec2::new(3.0e38, 10.0);
        assert!(config.validate().is_err());

        let mut config = SimConfig::canvas_shapes();
        config.spawn.speed_max = 3.0e38;
        config.spawn.size_min = 0.0;
        config.spawn.size_max = f32::MAX;
        assert!(config.validate().is_ok());
        config.spawn.scale_min = 0.0;
        config.spawn.scale_max = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("rotating".parse::<AnimationMode>().unwrap(), AnimationMode::Rotating);
        assert!("spinning".parse::<AnimationMode>().is_err());
        for mode in AnimationMode::ALL {
            assert_eq!(mode.to_string().parse::<AnimationMode>().unwrap(), mode);
        }
    }

    #[test]
    fn toml_round_trip_keeps_infinite_lifetime() {
        let config = SimConfig::canvas_shapes();
        let text = config.to_toml_string().unwrap();
        let parsed = SimConfig::from_toml_str(&text).unwrap();
        assert!(parsed.spawn.lifetime_max.is_infinite());
        assert_eq!(parsed.population, config.population);
    }
}
