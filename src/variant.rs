// src/variant.rs
//
// Disease-variant subsystem: a fixed catalogue of latent strains, each
// with its own transmissibility / lethality / immune-escape profile.
// A variant emerges once enough of the population has ever been infected,
// then grows logistically in prevalence and pulls the aggregate disease
// parameters toward its own.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{Config, DiseaseConfig, VariantSpec};

/// Prevalence a variant starts at the moment it emerges.
const INITIAL_PREVALENCE: f64 = 0.05;

/// Combined active prevalence below which variants have no aggregate
/// effect yet.
const PREVALENCE_EPSILON: f64 = 0.01;

/// One strain in the catalogue: its fixed trait profile plus its
/// per-run emergence / prevalence state.
#[derive(Debug, Clone)]
pub struct DiseaseVariant {
    pub spec: VariantSpec,
    /// One-way emergence flag.
    pub emerged: bool,
    /// Share of current infections attributable to this strain.
    pub prevalence: f64,
}

impl DiseaseVariant {
    pub fn from_spec(spec: VariantSpec) -> Self {
        DiseaseVariant {
            spec,
            emerged: false,
            prevalence: 0.0,
        }
    }

    /// Logistic prevalence growth, boosted by the strain's transmission
    /// advantage over baseline. No-op until the variant has emerged.
    fn grow_prevalence(&mut self, base_increase: f64) {
        if !self.emerged {
            return;
        }
        let r0_advantage = (self.spec.r0_modifier - 1.0).max(0.0);
        let change = base_increase * (1.0 + 2.0 * r0_advantage) * (1.0 - self.prevalence);
        self.prevalence = (self.prevalence + change).clamp(0.0, 1.0);
    }
}

/// Aggregate multipliers the step algorithm applies on top of the base
/// disease parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantEffects {
    pub r0: f64,
    pub mortality: f64,
    pub immune_escape: f64,
}

impl VariantEffects {
    pub const NEUTRAL: VariantEffects = VariantEffects {
        r0: 1.0,
        mortality: 1.0,
        immune_escape: 0.0,
    };
}

/// Read-only snapshot of one catalogue entry, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct VariantStatus {
    pub name: String,
    pub active: bool,
    pub prevalence: f64,
    pub r0_modifier: f64,
    pub mortality_modifier: f64,
    pub immune_escape: f64,
}

/// The variant catalogue plus emergence / prevalence dynamics.
#[derive(Debug, Clone)]
pub struct VariantPool {
    variants: Vec<DiseaseVariant>,
}

impl VariantPool {
    /// Build the latent pool from the configured catalogue.
    pub fn from_config(cfg: &Config) -> Self {
        VariantPool {
            variants: cfg
                .variants
                .iter()
                .cloned()
                .map(DiseaseVariant::from_spec)
                .collect(),
        }
    }

    /// Per-step update: grow the prevalence of every active strain, then
    /// roll emergence for eligible latent ones. A strain that emerges
    /// this step keeps its initial 5% prevalence until the next step.
    ///
    /// `ever_infected_fraction` is cumulative first-time infections over
    /// the initial population.
    pub fn update(
        &mut self,
        ever_infected_fraction: f64,
        disease: &DiseaseConfig,
        rng: &mut ChaCha8Rng,
    ) {
        for v in &mut self.variants {
            v.grow_prevalence(disease.variant_prevalence_increase);
        }
        for v in &mut self.variants {
            if !v.emerged
                && ever_infected_fraction >= v.spec.emergence_threshold
                && rng.gen::<f64>() < disease.variant_emergence_rate
            {
                v.emerged = true;
                v.prevalence = INITIAL_PREVALENCE;
            }
        }
    }

    /// Prevalence-weighted aggregate effect of all active strains.
    ///
    /// Neutral when nothing has emerged or combined prevalence is still
    /// negligible.
    pub fn aggregate_effects(&self) -> VariantEffects {
        let total_prevalence: f64 = self.active().map(|v| v.prevalence).sum();
        if total_prevalence < PREVALENCE_EPSILON {
            return VariantEffects::NEUTRAL;
        }

        let mut effects = VariantEffects::NEUTRAL;
        for v in self.active() {
            let weight = v.prevalence / total_prevalence;
            effects.r0 += (v.spec.r0_modifier - 1.0) * weight;
            effects.mortality += (v.spec.mortality_modifier - 1.0) * weight;
            effects.immune_escape += v.spec.immune_escape * weight;
        }
        effects
    }

    pub fn active(&self) -> impl Iterator<Item = &DiseaseVariant> {
        self.variants.iter().filter(|v| v.emerged)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Mean prevalence across active strains, 0 when none are active.
    pub fn average_active_prevalence(&self) -> f64 {
        let n = self.active_count();
        if n == 0 {
            return 0.0;
        }
        self.active().map(|v| v.prevalence).sum::<f64>() / n as f64
    }

    /// Highest prevalence among active strains. Prevalence only grows,
    /// so this is also the run peak.
    pub fn peak_prevalence(&self) -> f64 {
        self.active().map(|v| v.prevalence).fold(0.0, f64::max)
    }

    pub fn active_names(&self) -> Vec<String> {
        self.active().map(|v| v.spec.name.clone()).collect()
    }

    /// Snapshot of the full catalogue (latent strains included).
    pub fn status(&self) -> Vec<VariantStatus> {
        self.variants
            .iter()
            .map(|v| VariantStatus {
                name: v.spec.name.clone(),
                active: v.emerged,
                prevalence: v.prevalence,
                r0_modifier: v.spec.r0_modifier,
                mortality_modifier: v.spec.mortality_modifier,
                immune_escape: v.spec.immune_escape,
            })
            .collect()
    }
}
