// src/logging.rs
//
// Telemetry sinks for epidemica.
// - EventSink: trait the run loop writes through
// - NoopSink:  discards all events
// - FileSink:  one JSON record per step for downstream analysis/plotting

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::state::SimulationState;
use crate::types::StepIndex;
use crate::variant::VariantStatus;

/// Abstract sink for per-step telemetry.
pub trait EventSink {
    fn log_step(&mut self, step: StepIndex, state: &SimulationState, variants: &[VariantStatus]);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_step(&mut self, _step: StepIndex, _state: &SimulationState, _variants: &[VariantStatus]) {
        // intentionally no-op
    }
}

/// One JSONL record per simulated day.
#[derive(Serialize)]
struct StepRecord<'a> {
    step: StepIndex,
    susceptible: f64,
    infected: f64,
    recovered: f64,
    deaths: f64,
    total: f64,
    current_gdp: f64,
    research_progress: f64,
    contained: bool,
    active_variants: Vec<&'a str>,
}

/// JSONL file sink: each step is written as a single JSON object on its
/// own line.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl EventSink for FileSink {
    fn log_step(&mut self, step: StepIndex, state: &SimulationState, variants: &[VariantStatus]) {
        let record = StepRecord {
            step,
            susceptible: state.population.susceptible,
            infected: state.population.infected,
            recovered: state.population.recovered,
            deaths: state.population.deaths,
            total: state.population.total,
            current_gdp: state.economy.current_gdp,
            research_progress: state.research.progress,
            contained: state.outbreak.contained,
            active_variants: variants
                .iter()
                .filter(|v| v.active)
                .map(|v| v.name.as_str())
                .collect(),
        };

        // If telemetry fails we don't want to crash the engine, so I/O
        // errors are deliberately ignored.
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = self.writer.write_all(line.as_bytes());
            let _ = self.writer.write_all(b"\n");
            let _ = self.writer.flush();
        }
    }
}
