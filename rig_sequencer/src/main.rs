//! # Rig Sequencer
//!
//! Closed-loop sequencing controller for an automated mining rig.
//!
//! Loads the rig configuration, resolves a hardware backend through the
//! driver registry, resumes the persisted phase, and enters the tick loop.
//! `start`/`stop`/`resume` toggle the cadence; the phase itself only ever
//! moves through the sequencer's own step.
//!
//! # Usage
//!
//! ```bash
//! # Run against the simulated rig
//! rig_sequencer --config config/rig.toml
//!
//! # Boot with the cadence suspended
//! rig_sequencer --hold
//!
//! # Verbose logging
//! rig_sequencer -v
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use rig_common::config::{RigConfig, load_config};
use rig_hal::builtin_registry;
use rig_sequencer::cycle::TickRunner;
use rig_sequencer::storage::FilePhaseStore;

/// Rig Sequencer - closed-loop drilling controller
#[derive(Parser, Debug)]
#[command(name = "rig_sequencer")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Closed-loop sequencing controller for an automated mining rig")]
struct Args {
    /// Path to rig configuration TOML.
    #[arg(short, long, default_value = "config/rig.toml")]
    config: PathBuf,

    /// Hardware backend to drive.
    #[arg(short, long, default_value = "simulation")]
    driver: String,

    /// Override the resume-slot path from the config.
    #[arg(long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Boot with the cadence suspended (no initial start command).
    #[arg(long)]
    hold: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Rig Sequencer v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Rig Sequencer shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_or_default(&args.config)?;
    if let Some(ref path) = args.state_file {
        config.state_file = path.clone();
    }
    info!(
        "Config OK: tick_interval={}ms, state_file={}",
        config.tick_interval_ms,
        config.state_file.display()
    );

    let registry = builtin_registry();
    let mut rig = registry.create_driver(&args.driver)?;
    info!("Driver: {} v{}", rig.name(), rig.version());
    rig.init(&config)?;
    rig.write_status(&format!(
        "Rig sequencer v{} ready",
        env!("CARGO_PKG_VERSION")
    ));

    let store = FilePhaseStore::new(&config.state_file);
    let mut runner = TickRunner::new(&config, rig, Box::new(store));

    // Setup signal handler for graceful shutdown.
    let running = runner.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    if !args.hold {
        runner.command("start")?;
    }

    runner.run()?;
    Ok(())
}

/// Load the rig config, falling back to defaults when the file is absent.
fn load_or_default(path: &Path) -> Result<RigConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        let config = load_config(path)?;
        info!("Loaded rig config from {}", path.display());
        Ok(config)
    } else {
        warn!(
            "No config file at {}. Continuing with built-in defaults.",
            path.display()
        );
        Ok(RigConfig::default())
    }
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
