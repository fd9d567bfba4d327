// src/main.rs
//
// Thin harness around the epidemica library.
// All of the real logic lives in the lib crate (engine, strategies,
// scoring); this binary just wires a preset strategy to an engine and
// prints the result record as JSON.

use clap::Parser;

use epidemica::{
    strategy_by_name, Config, Engine, EventSink, FileSink, NoopSink, ScoreStats, STRATEGY_NAMES,
};

/// Command-line arguments for the epidemica binary.
#[derive(Parser, Debug)]
#[command(name = "epidemica")]
struct Cli {
    /// Number of simulated days to run.
    #[arg(long, default_value_t = 365)]
    steps: u64,

    /// RNG seed; repeated runs add 1 per run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Preset strategy: baseline, extreme-lockdown, economy-only,
    /// adaptive, research-priority.
    #[arg(long, default_value = "baseline")]
    strategy: String,

    /// Number of runs; with more than one, per-run scores are
    /// aggregated into mean / stddev / min / max.
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Optional JSONL path for the per-step telemetry log
    /// (first run only).
    #[arg(long)]
    log_jsonl: Option<String>,
}

/// Build the telemetry sink as a trait object so we can choose between
/// FileSink and NoopSink at runtime.
fn build_sink(log_jsonl: Option<&str>) -> Box<dyn EventSink> {
    if let Some(path) = log_jsonl {
        match FileSink::create(path) {
            Ok(s) => Box::new(s),
            Err(err) => {
                eprintln!(
                    "Failed to create log file ({path}), \
                     falling back to NoopSink: {err}"
                );
                Box::new(NoopSink)
            }
        }
    } else {
        Box::new(NoopSink)
    }
}

fn main() {
    let cli = Cli::parse();

    if strategy_by_name(&cli.strategy).is_none() {
        eprintln!(
            "Unknown strategy '{}'. Available: {}",
            cli.strategy,
            STRATEGY_NAMES.join(", ")
        );
        std::process::exit(2);
    }

    let mut stats = ScoreStats::new();

    for run in 0..cli.runs.max(1) {
        let mut engine = Engine::with_seed(Config::default(), cli.seed + run as u64);
        if run == 0 {
            engine.set_sink(build_sink(cli.log_jsonl.as_deref()));
        }

        // Lookup cannot fail: validated above.
        let interventions = strategy_by_name(&cli.strategy).unwrap_or_default();
        let result = engine.run(cli.steps, interventions);
        stats.record(result.final_score);

        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Failed to serialize result: {err}"),
        }
    }

    if cli.runs > 1 {
        println!(
            "{{\"strategy\":{:?},\"runs\":{},\"mean_score\":{:.4},\"stddev\":{:.4},\"min\":{:.4},\"max\":{:.4}}}",
            cli.strategy,
            stats.count(),
            stats.mean(),
            stats.stddev(),
            stats.min(),
            stats.max(),
        );
    }
}
