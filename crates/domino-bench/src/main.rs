use std::path::PathBuf;

use clap::Parser;

use domino_bench::config::{ResolvedOutputs, ScenarioConfig};
use domino_bench::logging::init_logging;
use domino_bench::replay::ScenarioRunner;

/// Replays a domino scenario and reports exact hand probabilities.
#[derive(Debug, Parser)]
#[command(
    name = "domino-bench",
    author,
    version,
    about = "Deterministic domino inference harness"
)]
struct Cli {
    /// Path to the YAML scenario file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/scenario.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Deal the observer's hand from this seed instead of any configured hand.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (nothing is replayed).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ScenarioConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        config.table.seed = Some(seed);
        config.table.observer_hand = None;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let move_count = config.moves.len();
    let parties = config.table.parties;

    println!(
        "Loaded scenario '{run_id}' with {parties} parties and {move_count} move{}",
        if move_count == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: replay skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = ScenarioRunner::new(config, outputs)?;
    let summary = runner.run()?;

    println!(
        "Scenario '{}' complete: {} moves, {} live tiles, {} branches",
        summary.run_id, summary.moves_applied, summary.live_items, summary.branch_count
    );
    println!("Report (JSON): {}", summary.report_path.display());
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
