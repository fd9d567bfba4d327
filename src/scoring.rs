// src/scoring.rs
//
// End-of-run scoring: reduce a finished run to component scores in [0, 1],
// a power-curved weighted raw score, and a normalized final score.
//
// The weight rebalancing and the variant-control substitution use
// empirically tuned constants; changing them changes every historical
// score, so they stay fixed.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::Config;
use crate::state::{Allocations, ImpactTracker, SimulationState};
use crate::types::StepIndex;
use crate::variant::VariantPool;

/// Final population / economy / research numbers for downstream reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RawOutcome {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
    pub deaths: f64,
    pub total_population: f64,
    pub initial_population: f64,
    pub current_gdp: f64,
    pub initial_gdp: f64,
    pub research_progress: f64,
}

/// The result record of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    // Component scores, each in [0, 1].
    pub population_survived: f64,
    pub gdp_preserved: f64,
    pub infection_control: f64,
    pub resource_efficiency: f64,
    pub time_to_containment: f64,
    pub variant_control: f64,

    // Score pipeline stages.
    pub raw_score: f64,
    pub normalized_score: f64,
    pub final_score: f64,

    // Variant summary.
    pub variants_emerged: usize,
    pub variant_names: Vec<String>,
    pub peak_variant_prevalence: f64,

    // Run shape.
    pub contained: bool,
    pub containment_step: Option<StepIndex>,
    pub steps_requested: u64,
    pub seed: u64,

    pub allocations: Allocations,
    pub outcome: RawOutcome,
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Reduce a finished run to its result record.
///
/// Pure except for the final jitter draw, which comes from the engine's
/// seeded generator so identical seeds score identically.
#[allow(clippy::too_many_arguments)]
pub fn score_run(
    cfg: &Config,
    state: &SimulationState,
    allocations: &Allocations,
    impacts: &ImpactTracker,
    variants: &VariantPool,
    steps_requested: u64,
    seed: u64,
    rng: &mut ChaCha8Rng,
) -> RunResult {
    let initial_population = cfg.population.initial_population;

    let population_survived = if initial_population > 0.0 {
        clamp01(1.0 - state.population.deaths / initial_population)
    } else {
        0.0
    };

    let gdp_preserved = clamp01(state.gdp_ratio());

    let infection_control = if initial_population > 0.0 {
        clamp01(1.0 - state.outbreak.max_infected / initial_population)
    } else {
        0.0
    };

    let resource_efficiency = resource_efficiency(cfg, allocations);

    let time_to_containment = match state.outbreak.containment_step {
        Some(step) if steps_requested > 0 => clamp01(1.0 - step as f64 / steps_requested as f64),
        _ => 0.0,
    };

    let any_variants = variants.active_count() > 0;
    let variant_control = if any_variants {
        let research_factor = state.research.progress * 0.3;
        let prevalence_factor = 1.0 - variants.average_active_prevalence();
        clamp01((research_factor + prevalence_factor) / 1.3)
    } else {
        // Nothing emerged: perfect score.
        1.0
    };

    // Strategy-impact bonus: rewards having actually pulled the levers.
    let strategy_bonus = ((impacts.containment * 0.3
        + impacts.economic * 0.3
        + impacts.healthcare * 0.3
        + impacts.research * 0.1)
        / 5.0)
        .min(cfg.scoring.strategy_bonus_cap);

    // Weight table, with the variant-control substitution and the
    // healthcare-vs-economy rebalance.
    let mut w_population = 0.35;
    let mut w_gdp = 0.25;
    let w_infection = 0.25;
    let w_efficiency = 0.10;
    let w_time = 0.05;
    let w_variant = if any_variants { 0.15 } else { 0.0 };

    if impacts.healthcare > impacts.economic {
        w_population += 0.05;
        w_gdp -= 0.05;
    } else {
        w_gdp += 0.05;
        w_population -= 0.05;
    }

    let power = cfg.scoring.component_power;
    let mut raw_score = population_survived.powf(power) * w_population
        + gdp_preserved.powf(power) * w_gdp
        + infection_control.powf(power) * w_infection
        + resource_efficiency.powf(power) * w_efficiency
        + time_to_containment.powf(power) * w_time;
    if any_variants {
        raw_score += variant_control.powf(power) * w_variant;
    }
    raw_score = (raw_score * (1.0 + strategy_bonus)).min(1.0);

    // Baseline shift + exponential curve + renormalization into [0, 1].
    let baseline = cfg.scoring.baseline;
    let curve = cfg.scoring.curve_factor;
    let adjusted = baseline + (1.0 - baseline) * raw_score;
    let floor = baseline.powf(curve);
    let denom = 1.0 - floor;
    let mut normalized = if denom > 0.0 {
        clamp01((adjusted.powf(curve) - floor) / denom)
    } else {
        0.0
    };

    // Multi-objective bonus: mean of the pairwise geometric means rewards
    // strategies that do well on several axes at once.
    let multi_objective = ((infection_control * gdp_preserved).sqrt()
        + (population_survived * gdp_preserved).sqrt()
        + (infection_control * population_survived).sqrt())
        / 3.0;
    normalized = (normalized + multi_objective * 0.1).min(1.0);

    if infection_control > 0.7 && population_survived > 0.8 {
        normalized = (normalized + 0.03).min(1.0);
    }
    if gdp_preserved > 0.7 && population_survived > 0.7 {
        normalized = (normalized + 0.03).min(1.0);
    }
    if population_survived < 0.5 || infection_control < 0.3 {
        normalized = (normalized - 0.07).max(0.0);
    }

    // Tie-break jitter, only applied when it stays inside [0, 1].
    let jitter_width = cfg.scoring.score_jitter;
    if jitter_width > 0.0 {
        let jitter = rng.gen_range(-jitter_width..jitter_width);
        if (0.0..=1.0).contains(&(normalized + jitter)) {
            normalized += jitter;
        }
    }

    RunResult {
        population_survived,
        gdp_preserved,
        infection_control,
        resource_efficiency,
        time_to_containment,
        variant_control,
        raw_score,
        normalized_score: normalized,
        final_score: normalized,
        variants_emerged: variants.active_count(),
        variant_names: variants.active_names(),
        peak_variant_prevalence: variants.peak_prevalence(),
        contained: state.outbreak.contained,
        containment_step: state.outbreak.containment_step,
        steps_requested,
        seed,
        allocations: allocations.clone(),
        outcome: RawOutcome {
            susceptible: state.population.susceptible,
            infected: state.population.infected,
            recovered: state.population.recovered,
            deaths: state.population.deaths,
            total_population: state.population.total,
            initial_population,
            current_gdp: state.economy.current_gdp,
            initial_gdp: state.economy.initial_gdp,
            research_progress: state.research.progress,
        },
    }
}

/// Base efficiency falls off past the soft budget cap; a balance bonus
/// rewards spreading spend evenly across the three categories.
fn resource_efficiency(cfg: &Config, allocations: &Allocations) -> f64 {
    let total = allocations.total;
    if total <= 0.0 {
        return 0.0;
    }

    let base = (cfg.interventions.resource_budget_soft_cap / total).min(1.0);

    let third = 1.0 / 3.0;
    let balance = 1.0
        - ((allocations.healthcare / total - third).abs()
            + (allocations.economic / total - third).abs()
            + (allocations.research / total - third).abs())
            / 2.0;

    clamp01(base * (0.7 + 0.3 * balance))
}
