// src/state.rs
//
// Simulation state for the epidemica engine.
//
// `SimulationState` is the record step callbacks observe and the scoring
// pass reads. `ControlState`, `Allocations` and `ImpactTracker` are
// engine-owned intervention trackers that never leave the engine except
// through the final `RunResult`.

use serde::Serialize;

use crate::config::Config;
use crate::types::{ResourceCategory, StepIndex};

/// Population compartments (continuous head-counts).
///
/// `total` tracks `susceptible + infected + recovered`; `deaths` is a
/// separate cumulative counter and never decreases.
#[derive(Debug, Clone, Serialize)]
pub struct Population {
    pub total: f64,
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub deaths: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Economy {
    /// GDP at reset(); fixed for the run.
    pub initial_gdp: f64,
    /// GDP after the per-step sector-health smoothing.
    pub current_gdp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Research {
    /// Cure/vaccine progress in [0, 1]; monotone non-decreasing.
    pub progress: f64,
}

/// Run-level outbreak tracking.
#[derive(Debug, Clone, Serialize)]
pub struct Outbreak {
    /// One-way flag: effective transmission below replacement and active
    /// infections under 1% of the population.
    pub contained: bool,
    /// Step at which containment was first reached, if ever.
    pub containment_step: Option<StepIndex>,
    /// Running maximum of the infected compartment.
    pub max_infected: f64,
}

/// The per-step snapshot visible to strategy callbacks.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    pub step: StepIndex,
    pub population: Population,
    pub economy: Economy,
    pub research: Research,
    pub outbreak: Outbreak,
}

impl SimulationState {
    pub fn new(cfg: &Config) -> Self {
        let pop = &cfg.population;
        SimulationState {
            step: 0,
            population: Population {
                total: pop.initial_population,
                susceptible: pop.initial_population - pop.initial_infected,
                infected: pop.initial_infected,
                recovered: 0.0,
                deaths: 0.0,
            },
            economy: Economy {
                initial_gdp: pop.initial_gdp,
                current_gdp: pop.initial_gdp,
            },
            research: Research { progress: 0.0 },
            outbreak: Outbreak {
                contained: false,
                containment_step: None,
                max_infected: pop.initial_infected,
            },
        }
    }

    /// Infected share of the current population, 0 when nobody is left.
    pub fn infection_rate(&self) -> f64 {
        if self.population.total > 0.0 {
            self.population.infected / self.population.total
        } else {
            0.0
        }
    }

    /// Current-to-initial GDP ratio, 0 when initial GDP is zero.
    pub fn gdp_ratio(&self) -> f64 {
        if self.economy.initial_gdp > 0.0 {
            self.economy.current_gdp / self.economy.initial_gdp
        } else {
            0.0
        }
    }
}

/// Intervention trackers the step algorithm reads.
///
/// Lockdown history is append-only; compliance only falls within a run
/// (reset() restores it). Sector health entries align with
/// `cfg.sectors` by index.
#[derive(Debug, Clone)]
pub struct ControlState {
    pub lockdown_history: Vec<f64>,
    pub compliance: f64,
    pub healthcare_capacity: f64,
    pub sector_health: Vec<f64>,
    pub current_r0: f64,
    pub current_lockdown_level: f64,
    pub travel_restricted: bool,
    /// Cumulative first-time infections; gates variant emergence.
    pub total_ever_infected: f64,
}

impl ControlState {
    pub fn new(cfg: &Config) -> Self {
        ControlState {
            lockdown_history: Vec::new(),
            compliance: 1.0,
            healthcare_capacity: 1.0,
            sector_health: vec![1.0; cfg.sectors.len()],
            current_r0: cfg.disease.r0_base,
            current_lockdown_level: 0.0,
            travel_restricted: false,
            total_ever_infected: cfg.population.initial_infected,
        }
    }

    /// GDP-weighted average of sector health.
    pub fn weighted_sector_health(&self, cfg: &Config) -> f64 {
        cfg.sectors
            .iter()
            .zip(&self.sector_health)
            .map(|(s, h)| h * s.gdp_weight)
            .sum()
    }
}

/// Running resource-allocation totals, one bucket per category plus the
/// grand total, updated atomically with each allocation call.
///
/// Buckets record the *requested* amounts: over-budget requests count in
/// full against resource-efficiency scoring even though only the scaled
/// amount takes effect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Allocations {
    pub healthcare: f64,
    pub economic: f64,
    pub research: f64,
    pub total: f64,
}

impl Allocations {
    pub fn get(&self, category: ResourceCategory) -> f64 {
        match category {
            ResourceCategory::Healthcare => self.healthcare,
            ResourceCategory::Economic => self.economic,
            ResourceCategory::Research => self.research,
        }
    }

    pub fn add(&mut self, category: ResourceCategory, amount: f64) {
        match category {
            ResourceCategory::Healthcare => self.healthcare += amount,
            ResourceCategory::Economic => self.economic += amount,
            ResourceCategory::Research => self.research += amount,
        }
        self.total += amount;
    }
}

/// Scoring accumulators credited by the intervention functions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImpactTracker {
    pub containment: f64,
    pub economic: f64,
    pub healthcare: f64,
    pub research: f64,
}
