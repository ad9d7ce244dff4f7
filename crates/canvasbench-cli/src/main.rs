//! canvasbench CLI - headless runs of the canvas benchmark simulation

mod commands;

use anyhow::Result;
use canvasbench_sim::AnimationMode;
use clap::{Parser, Subcommand};
use commands::{config, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "canvasbench")]
#[command(about = "Entity population benchmark for 2D canvas renderers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless on a fixed frame clock
    Run {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Built-in preset (shapes, fountain); ignored when --config is given
        #[arg(long, default_value = "shapes")]
        preset: String,

        /// Target population
        #[arg(short, long)]
        count: Option<u32>,

        /// Seconds to ramp to the target (0 = instant)
        #[arg(short, long)]
        window: Option<f32>,

        /// Animation mode (static, rotating, scaling, interactive, stress)
        #[arg(long, value_parser = parse_mode)]
        mode: Option<AnimationMode>,

        /// Number of frames to simulate
        #[arg(long, default_value = "600")]
        frames: u32,

        /// Frame rate of the synthetic clock
        #[arg(long, default_value = "60")]
        fps: u32,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Log a metrics line every N frames (0 disables)
        #[arg(long, default_value = "60")]
        report_every: u32,
    },

    /// Print a preset configuration as TOML
    Config {
        /// Built-in preset (shapes, fountain)
        #[arg(long, default_value = "shapes")]
        preset: String,
    },
}

fn parse_mode(s: &str) -> Result<AnimationMode, String> {
    s.parse::<AnimationMode>().map_err(|_| {
        let names: Vec<&str> = AnimationMode::ALL.iter().map(|m| m.as_str()).collect();
        format!("Invalid mode '{}'. Valid modes: {}", s, names.join(", "))
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            preset,
            count,
            window,
            mode,
            frames,
            fps,
            seed,
            report_every,
        } => run::run(run::RunArgs {
            config,
            preset,
            count,
            window,
            mode,
            frames,
            fps,
            seed,
            report_every,
        }),
        Commands::Config { preset } => config::run(&preset),
    }
}
