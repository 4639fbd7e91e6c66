//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// terrawalk command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terrawalk", about = "Procedural terrain with a walkable player")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Side length of the square terrain.
    #[arg(long)]
    pub terrain_size: Option<f64>,

    /// Mesh cells per side.
    #[arg(long)]
    pub subdivisions: Option<u32>,

    /// Number of simulation ticks to run.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write every placement to this file as RON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write a grayscale PNG of the heightfield to this file.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config. Output paths are not settings
    /// and stay on [`CliArgs`].
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(size) = args.terrain_size {
            self.world.terrain_size = size;
        }
        if let Some(subdivisions) = args.subdivisions {
            self.world.subdivisions = subdivisions;
        }
        if let Some(frames) = args.frames {
            self.simulation.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
