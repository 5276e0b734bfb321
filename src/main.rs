//! `radartrack` binary: runs one simulated tracking scenario.
//!
//! # Usage
//!
//! ```bash
//! radartrack --targets 3 --frames 100 --method PDA
//! radartrack --config run.json --summary-only
//! RUST_LOG=radartrack=debug radartrack --method NN
//! ```
//!
//! Frame results are written to stdout as JSON lines, followed by the run
//! summary. Logs go to stderr.

use std::error::Error;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use radartrack::config::{AssociationMethod, TrackerConfig};
use radartrack::engine::TrackingEngine;
use radartrack::models::ConstantVelocityScenario;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "radartrack",
    version,
    about = "Radar simulation and multi-target tracking",
    long_about = None
)]
struct Args {
    /// JSON run configuration. Defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the simulation seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of targets to simulate and track.
    #[arg(short, long)]
    targets: Option<usize>,

    /// Number of frames in the generated scenario.
    #[arg(short, long, default_value_t = 100)]
    frames: usize,

    /// Association method (NN or PDA).
    #[arg(short, long)]
    method: Option<AssociationMethod>,

    /// Only print the end-of-run summary.
    #[arg(long, default_value_t = false)]
    summary_only: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            TrackerConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => TrackerConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(targets) = args.targets {
        config.num_objects = targets;
    }
    if let Some(method) = args.method {
        config.association_method = method;
    }
    config.validate()?;

    let scenario = ConstantVelocityScenario {
        num_targets: config.num_objects,
        num_frames: args.frames,
        dt: config.dt,
        seed: config.seed,
        ..ConstantVelocityScenario::default()
    };

    let mut engine = TrackingEngine::new(scenario.generate()?);
    engine.reset(config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    while engine.remaining_frames() > 0 {
        let frame = engine.step()?;
        if !args.summary_only {
            serde_json::to_writer(&mut out, &frame)?;
            writeln!(out)?;
        }
    }

    let summary = engine.summary()?;
    info!(
        frames = summary.frames_processed,
        update_ratio = ?summary.update_ratio(),
        "run complete"
    );
    serde_json::to_writer_pretty(&mut out, &summary)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
