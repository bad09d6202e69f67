//! Headless Runeclash encounter runner.
//!
//! Loads an encounter file, plays it with a fixed time step and the file's
//! scripted player input, and prints the outcome.
//!
//! ```text
//! runeclash-sim --encounter encounters/duel.json --seed 7
//! RUST_LOG=runeclash_core=debug runeclash-sim --encounter encounters/duel.json
//! ```

mod runner;
mod scenario;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenario::Scenario;

/// Log directives used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "runeclash=info,runestat=warn";

/// Play a Runeclash encounter from a JSON file
#[derive(Parser, Debug)]
#[command(name = "runeclash-sim")]
#[command(about = "Headless Runeclash encounter runner", long_about = None)]
#[command(version)]
struct Args {
    /// Encounter file (config, skills, player, enemies, script)
    #[arg(short, long)]
    encounter: PathBuf,

    /// Seed for enemy skill selection
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Seconds advanced per step
    #[arg(long, default_value_t = 0.25)]
    dt: f32,

    /// Stop after this many enemy turns
    #[arg(long, default_value_t = 100)]
    max_turns: u32,

    /// Print every recorded event as JSON lines after the summary
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    ensure!(args.dt > 0.0 && args.dt.is_finite(), "--dt must be positive, got {}", args.dt);

    let scenario = Scenario::load(&args.encounter)?;
    info!(
        encounter = %args.encounter.display(),
        enemies = scenario.enemies.len(),
        seed = args.seed,
        "encounter loaded"
    );

    let combat = scenario.build(args.seed)?;
    let report = runner::run(&scenario, combat, args.dt, args.max_turns);

    print!("{}", report.summary);
    if args.events {
        for event in &report.events {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}
