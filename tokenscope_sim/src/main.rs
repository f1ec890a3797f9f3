//! Tokenscope simulation CLI
//!
//! Run deterministic animation acceptance scenarios, optionally exporting
//! revealed frames for offline replay.

use clap::Parser;
use std::str::FromStr;
use tokenscope_core::engine::{AnimationEngine, AnimationInput, EngineConfig, InputGeometry};
use tokenscope_env::ScopeContext;
use tokenscope_sim::scenarios::ScenarioId;
use tokenscope_sim::{
    AnimationExport, EmbeddingOracle, ScenarioResult, ScenarioRunner, SceneFrame, SimContext,
};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "tokenscope-sim",
    about = "Deterministic animation scenario runner"
)]
struct Args {
    /// Scenario name, "standard", "stress", or "all"
    #[arg(long, default_value = "standard")]
    scenario: String,

    /// Master seed; every input and deadline derives from it
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Export revealed frames of a full reveal as JSON
    #[arg(long)]
    export: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Runs a full reveal with frame-by-frame capture for the replay viewer.
fn run_with_export(seed: u64, export_path: &str) -> std::io::Result<()> {
    let ctx = SimContext::new(seed);
    let mut engine = AnimationEngine::new(EngineConfig::default());
    let mut oracle = EmbeddingOracle::new(seed);

    let (sentence, tokens) = oracle.sentence(5);
    let batch = oracle.embedding_batch(5, 768, 2.0);
    engine.submit(
        AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
        ctx.now(),
    );

    let mut export = AnimationExport::new(ScenarioId::FullReveal.name(), seed);
    let mut guard = 0;
    while let Some(deadline) = engine.next_deadline() {
        guard += 1;
        if guard > 100_000 {
            break;
        }
        let now = ctx.now();
        if deadline > now {
            ctx.advance_time(deadline - now);
        }
        engine.tick(ctx.now());
        export.add_frame(SceneFrame {
            time_sec: ctx.now().as_secs_f64(),
            scene: engine.scene(ctx.now()),
        });
    }

    let final_phase = engine
        .state()
        .map(|s| s.phase)
        .unwrap_or(tokenscope_core::Phase::Idle);
    export.finalize(engine.is_complete(), final_phase);
    export.write_to_file(export_path)?;
    info!(
        "exported {} frames ({:.2}s of animation) to {}",
        export.frames.len(),
        export.duration_sec,
        export_path
    );
    Ok(())
}

fn scenario_list(selector: &str) -> Result<Vec<ScenarioId>, String> {
    match selector {
        "all" => Ok(ScenarioId::all()),
        "standard" => Ok(ScenarioId::standard()),
        "stress" => Ok(ScenarioId::stress()),
        name => ScenarioId::from_str(name).map(|s| vec![s]),
    }
}

fn print_summary(results: &[ScenarioResult]) {
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for result in results {
        info!(
            "  {} {:<20} events={:<6} steps={:<4} t={:.2}s",
            if result.passed { "✓" } else { "✗" },
            result.scenario.name(),
            result.total_events,
            result.metrics.reveal_steps,
            result.final_time_secs,
        );
        if let Some(reason) = &result.failure_reason {
            info!("      reason: {}", reason);
        }
    }
    let passed = results.iter().filter(|r| r.passed).count();
    info!("  {}/{} scenarios passed", passed, results.len());
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging already initialized");
    }

    let scenarios = match scenario_list(&args.scenario) {
        Ok(scenarios) => scenarios,
        Err(err) => {
            error!("{}", err);
            error!(
                "known scenarios: {}",
                ScenarioId::all()
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(2);
        }
    };

    let runner = ScenarioRunner::new(args.seed);
    let results: Vec<ScenarioResult> = scenarios.iter().map(|s| runner.run(*s)).collect();
    print_summary(&results);

    if let Some(path) = &args.export {
        if let Err(err) = run_with_export(args.seed, path) {
            error!("export failed: {}", err);
            std::process::exit(1);
        }
    }

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
}
