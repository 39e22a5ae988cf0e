//! Command-line interface for EncounterSim

use clap::Parser;
use std::path::PathBuf;

/// Scripted boss encounter simulator
#[derive(Parser, Debug)]
#[command(name = "encountersim")]
#[command(about = "Scripted boss encounter simulator")]
#[command(version)]
pub struct Args {
    /// Encounter configuration file (JSON); defaults to a three-player party
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Output path for the encounter log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum encounter duration in seconds (overrides the config file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for deterministic reproduction (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
