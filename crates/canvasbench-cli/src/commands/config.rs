//! Preset printing command

use anyhow::{Context, Result};
use canvasbench_sim::SimConfig;

pub fn run(preset: &str) -> Result<()> {
    let config = SimConfig::preset(preset).with_context(|| format!("unknown preset '{preset}'"))?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
