//! Headless benchmark run

use anyhow::{bail, Context, Result};
use canvasbench_runtime::{FrameDriver, NullRenderer};
use canvasbench_sim::{AnimationMode, SimConfig, SimulationEngine};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub preset: String,
    pub count: Option<u32>,
    pub window: Option<f32>,
    pub mode: Option<AnimationMode>,
    pub frames: u32,
    pub fps: u32,
    pub seed: Option<u64>,
    pub report_every: u32,
}

fn build_config(args: &RunArgs) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimConfig::preset(&args.preset)?,
    };
    if let Some(count) = args.count {
        config.population.target_count = count;
    }
    if let Some(window) = args.window {
        config.population.emission_window = window;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: RunArgs) -> Result<()> {
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }
    let config = build_config(&args)?;
    info!(
        "{} entities over {}s, mode {}, seed {:#x}",
        config.population.target_count,
        config.population.emission_window,
        config.mode,
        config.seed
    );

    let engine = SimulationEngine::from_config(config)?;
    let mut driver = FrameDriver::new(engine, NullRenderer::new());
    let interval = Duration::from_secs_f64(1.0 / args.fps as f64);

    let report_every = args.report_every as u64;
    let summary = driver.run_fixed_with(args.frames, interval, |metrics| {
        if report_every > 0 && metrics.frames % report_every == 0 {
            info!(
                "frame {}: {} active, {:.1} fps, tick {:.3}ms",
                metrics.frames, metrics.active_count, metrics.fps, metrics.last_tick_ms
            );
        }
    })?;
    driver.stop();

    let stats = driver.engine().stats();
    println!("Simulated {:.2}s over {} frames", summary.simulated_seconds, summary.frames);
    println!(
        "  Active:   {} (peak {}, target {})",
        summary.final_active, summary.peak_active, stats.target
    );
    println!(
        "  Pool:     {} slots, {} idle, {:.1} KiB",
        stats.capacity,
        stats.idle,
        stats.memory_bytes as f64 / 1024.0
    );
    println!(
        "  Tick:     avg {:.3}ms, max {:.3}ms",
        summary.avg_tick_ms, summary.max_tick_ms
    );
    println!("  FPS:      {:.1}", summary.final_fps);
    Ok(())
}
