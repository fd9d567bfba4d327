// src/config.rs
//
// Central configuration for the epidemica engine.
// This is the single source of truth for disease dynamics, intervention
// response curves, the region / sector decomposition, and scoring shape.
//
// `Config::default()` reproduces the reference outbreak: 10k people, 100
// initially infected, base R0 of 3.8, three latent variants.

use crate::types::{Region, Sector};

#[derive(Debug, Clone)]
pub struct Config {
    /// Initial population / economy snapshot applied at reset().
    pub population: PopulationConfig,
    /// Disease dynamics (R0, mortality, noise, variants).
    pub disease: DiseaseConfig,
    /// Intervention response curves (fatigue, diminishing returns, budget).
    pub interventions: InterventionConfig,
    /// Static per-region parameters (urban / rural).
    pub regions: Vec<RegionParams>,
    /// Static per-sector parameters (essential / in-person / remote).
    pub sectors: Vec<SectorParams>,
    /// Latent variant catalogue; each entry may emerge at most once per
    /// run.
    pub variants: Vec<VariantSpec>,
    /// End-of-run scoring shape.
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone)]
pub struct PopulationConfig {
    /// Total population at reset().
    pub initial_population: f64,
    /// Infected head-count at reset(); the rest start susceptible.
    pub initial_infected: f64,
    /// GDP at reset(); also the fixed denominator for gdp_preserved.
    pub initial_gdp: f64,
}

#[derive(Debug, Clone)]
pub struct DiseaseConfig {
    /// Basic reproduction number absent any intervention.
    pub r0_base: f64,
    /// Half-width of the per-step uniform R0 perturbation.
    pub r0_variance: f64,
    /// Baseline infection-fatality rate per day of infection.
    pub mortality_base: f64,
    /// Half-width of the per-step uniform mortality perturbation.
    pub mortality_variance: f64,
    /// Mean days from infection to recovery.
    pub recovery_period_days: f64,
    /// Scales R0 contact pressure into a daily infection rate.
    pub infection_rate_scale: f64,
    /// Half-width of the multiplicative infection noise, drawn as
    /// uniform(1 - w, 1 + w) each step.
    pub infection_noise_width: f64,
    /// Per-step emergence probability once a variant's threshold is met.
    pub variant_emergence_rate: f64,
    /// Base per-step prevalence growth for an active variant.
    pub variant_prevalence_increase: f64,
}

#[derive(Debug, Clone)]
pub struct InterventionConfig {
    /// Max fractional R0 reduction a full lockdown can deliver.
    pub lockdown_r0_reduction: f64,
    /// Per-window multiplier on lockdown effectiveness (< 1).
    pub lockdown_diminishing_factor: f64,
    /// Per-call compliance decay once fatigue sets in.
    pub lockdown_compliance_decay: f64,
    /// Compliance never decays below this.
    pub compliance_floor: f64,
    /// Days of lockdown history before compliance starts decaying.
    pub fatigue_window: usize,
    /// Days of lockdown history per diminishing-returns notch.
    pub diminishing_window: usize,

    /// Infection share (of capacity) at which hospitals overwhelm.
    pub healthcare_capacity_threshold: f64,
    /// Mortality penalty scale while overwhelmed.
    pub healthcare_overwhelm_penalty: f64,
    /// Mortality reduction scale while hospitals cope.
    pub healthcare_mortality_reduction: f64,
    /// Saturation cap on the healthcare capacity multiplier.
    pub healthcare_capacity_cap: f64,
    /// Cumulative healthcare spend past which returns degrade.
    pub healthcare_saturation_spend: f64,

    /// Research progress gained per step per 100 units of cumulative spend.
    pub research_effectiveness: f64,
    /// Progress level that triggers the breakthrough regime.
    pub research_breakthrough_threshold: f64,
    /// Multiplier on research effectiveness after the breakthrough.
    pub research_breakthrough_effect: f64,

    /// Strength of the travel-restriction R0 reduction.
    pub travel_restriction_effectiveness: f64,
    /// Strength of the travel-restriction sector penalty.
    pub travel_economic_impact: f64,

    /// Soft global cap on total allocated resources; allocations past it
    /// are scaled down proportionally rather than rejected.
    pub resource_budget_soft_cap: f64,
}

/// Static parameters for one region.
#[derive(Debug, Clone)]
pub struct RegionParams {
    pub region: Region,
    /// Share of the population living here (shares sum to 1).
    pub population_share: f64,
    /// Multiplier on lockdown compliance (urban crowds comply less).
    pub compliance_mult: f64,
    /// Multiplier on travel-restriction effectiveness.
    pub travel_mult: f64,
}

/// Static parameters for one economic sector.
#[derive(Debug, Clone)]
pub struct SectorParams {
    pub sector: Sector,
    /// Share of GDP produced by this sector (weights sum to 1).
    pub gdp_weight: f64,
    /// Health lost per unit of effective lockdown.
    pub lockdown_impact: f64,
    /// Health restored per 100 units of economic support.
    pub support_coeff: f64,
    /// Multiplier on the travel-restriction economic penalty.
    pub travel_mult: f64,
}

/// Trait profile of one latent disease variant.
#[derive(Debug, Clone)]
pub struct VariantSpec {
    pub name: String,
    /// Multiplicative transmissibility vs. the base strain.
    pub r0_modifier: f64,
    /// Multiplicative lethality vs. the base strain.
    pub mortality_modifier: f64,
    /// Probability that recovered immunity fails against this strain.
    pub immune_escape: f64,
    /// Ever-infected population share required before emergence rolls
    /// begin.
    pub emergence_threshold: f64,
}

impl VariantSpec {
    pub fn new(
        name: &str,
        r0_modifier: f64,
        mortality_modifier: f64,
        immune_escape: f64,
        emergence_threshold: f64,
    ) -> Self {
        VariantSpec {
            name: name.to_string(),
            r0_modifier,
            mortality_modifier,
            immune_escape,
            emergence_threshold,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Floor added before the exponential curve (raises weak outcomes).
    pub baseline: f64,
    /// Exponent of the score-separating curve.
    pub curve_factor: f64,
    /// Per-component power applied before weighting.
    pub component_power: f64,
    /// Cap on the strategy-impact bonus multiplier.
    pub strategy_bonus_cap: f64,
    /// Half-width of the final uniform score perturbation.
    pub score_jitter: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population: PopulationConfig {
                initial_population: 10_000.0,
                initial_infected: 100.0,
                initial_gdp: 1_000.0,
            },
            disease: DiseaseConfig {
                r0_base: 3.8,
                r0_variance: 0.6,
                mortality_base: 0.025,
                mortality_variance: 0.01,
                recovery_period_days: 14.0,
                infection_rate_scale: 0.1,
                infection_noise_width: 0.2,
                variant_emergence_rate: 0.01,
                variant_prevalence_increase: 0.02,
            },
            interventions: InterventionConfig {
                lockdown_r0_reduction: 0.8,
                lockdown_diminishing_factor: 0.85,
                lockdown_compliance_decay: 0.02,
                compliance_floor: 0.5,
                fatigue_window: 15,
                diminishing_window: 30,

                healthcare_capacity_threshold: 0.7,
                healthcare_overwhelm_penalty: 2.5,
                healthcare_mortality_reduction: 0.85,
                healthcare_capacity_cap: 2.0,
                healthcare_saturation_spend: 500.0,

                research_effectiveness: 0.012,
                research_breakthrough_threshold: 0.8,
                research_breakthrough_effect: 0.6,

                travel_restriction_effectiveness: 0.7,
                travel_economic_impact: 0.15,

                resource_budget_soft_cap: 1_000.0,
            },
            regions: vec![
                RegionParams {
                    region: Region::Urban,
                    population_share: 0.7,
                    compliance_mult: 0.9,
                    travel_mult: 1.2,
                },
                RegionParams {
                    region: Region::Rural,
                    population_share: 0.3,
                    compliance_mult: 1.1,
                    travel_mult: 0.7,
                },
            ],
            sectors: vec![
                SectorParams {
                    sector: Sector::Essential,
                    gdp_weight: 0.3,
                    lockdown_impact: 0.2,
                    support_coeff: 0.05,
                    travel_mult: 0.5,
                },
                SectorParams {
                    sector: Sector::InPersonServices,
                    gdp_weight: 0.4,
                    lockdown_impact: 0.8,
                    support_coeff: 0.15,
                    travel_mult: 1.5,
                },
                SectorParams {
                    sector: Sector::RemoteCapable,
                    gdp_weight: 0.3,
                    lockdown_impact: 0.3,
                    support_coeff: 0.10,
                    travel_mult: 1.0,
                },
            ],
            variants: vec![
                VariantSpec::new("Alpha", 1.5, 1.1, 0.1, 0.2),
                VariantSpec::new("Beta", 1.3, 1.3, 0.3, 0.3),
                VariantSpec::new("Gamma", 1.7, 1.2, 0.5, 0.4),
            ],
            scoring: ScoringConfig {
                baseline: 0.4,
                curve_factor: 1.5,
                component_power: 1.5,
                strategy_bonus_cap: 0.3,
                score_jitter: 0.02,
            },
        }
    }
}

impl Config {
    /// Variance-free copy: zeroes every stochastic half-width so a step
    /// becomes a deterministic function of state. Used by tests that
    /// check monotonicity properties without noise.
    pub fn with_zero_noise(mut self) -> Self {
        self.disease.r0_variance = 0.0;
        self.disease.mortality_variance = 0.0;
        self.disease.infection_noise_width = 0.0;
        self.scoring.score_jitter = 0.0;
        self
    }
}
