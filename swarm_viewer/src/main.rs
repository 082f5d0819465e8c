//! swarm_viewer: interactive entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use swarm_engine::ModeKind;
use swarm_viewer::settings::{Settings, DEFAULT_SETTINGS_FILE};
use swarm_viewer::{run, AppConfig};

#[derive(Parser)]
#[command(name = "swarm_viewer")]
#[command(about = "Landmark-driven particle swarm with simulated hand and face tracking", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file, created on first change
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    width: usize,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    height: usize,

    /// Start in this mode instead of the saved one
    #[arg(long)]
    mode: Option<String>,

    /// Start with exactly this many particles
    #[arg(long)]
    particles: Option<usize>,

    /// Delete saved settings before starting
    #[arg(long)]
    reset: bool,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.reset {
        Settings::remove(&cli.settings)
            .with_context(|| format!("removing settings at {}", cli.settings.display()))?;
        info!("settings reset");
    }

    let cfg = AppConfig {
        width:         cli.width.max(1),
        height:        cli.height.max(1),
        seed:          cli.seed,
        settings_path: cli.settings,
        mode:          cli.mode.as_deref().map(ModeKind::from_name_or_default),
        particles:     cli.particles,
    };

    run(cfg).context("viewer stopped with an error")
}
