//! Epidemica core library.
//!
//! This crate exposes a controllable epidemic simulation engine: a
//! population moves through susceptible / infected / recovered / dead
//! compartments while caller-supplied strategies tune lockdown severity,
//! sector-targeted resource spending and travel restriction. The engine
//! also models economic damage, research-driven breakthroughs and
//! emergent disease variants, then reduces the whole run to a single
//! comparable score. The binary (`src/main.rs`) is just a thin research
//! harness around these components.
//!
//! All randomness draws from one seedable generator per engine, so a
//! (seed, strategy) pair reproduces its result record bit-identically.

pub mod config;
pub mod engine;
pub mod interventions;
pub mod logging;
pub mod metrics;
pub mod scoring;
pub mod state;
pub mod strategy;
pub mod types;
pub mod variant;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::{Config, VariantSpec};

pub use engine::Engine;

pub use logging::{EventSink, FileSink, NoopSink};

pub use metrics::ScoreStats;

pub use scoring::{RawOutcome, RunResult};

pub use state::{Allocations, ControlState, ImpactTracker, SimulationState};

pub use strategy::{
    strategy_by_name, AdaptiveResponse, CallbackFn, EconomyOnly, ExtremeLockdown, Intervention,
    InterventionFn, ResearchPriority, StepCallback, STRATEGY_NAMES,
};

pub use types::{Region, ResourceCategory, Sector, StepIndex};

pub use variant::{DiseaseVariant, VariantEffects, VariantPool, VariantStatus};

// --- Core conservation unit tests -------------------------------------------
