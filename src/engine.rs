// src/engine.rs
//
// The epidemica simulation engine:
//  - owns the whole per-run state aggregate (population, economy,
//    research, variants, intervention trackers),
//  - exposes the intervention entry points,
//  - advances one simulated day per step(), composing variant effects,
//    intervention state, stochastic noise and SIR population flows,
//  - drives the run loop and hands the finished run to scoring.
//
// Everything stochastic (step noise, variant emergence, the final score
// jitter) draws from one ChaCha8 generator, so a (seed, strategy) pair
// reproduces bit-identically. Concurrent runs want separate engines;
// there is no shared state.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::interventions::{apply_allocation, apply_lockdown, apply_travel_policy};
use crate::logging::{EventSink, NoopSink};
use crate::scoring::{score_run, RunResult};
use crate::state::{Allocations, ControlState, ImpactTracker, SimulationState};
use crate::strategy::{Intervention, StepCallback};
use crate::types::{ResourceCategory, StepIndex};
use crate::variant::{VariantPool, VariantStatus};

/// Hard floor on the stochastic reproduction number.
const R0_FLOOR: f64 = 0.5;

/// Hard floor on the stochastic mortality rate (before healthcare
/// adjustment).
const MORTALITY_FLOOR: f64 = 0.005;

/// Infected share of the population below which an outbreak with
/// sub-replacement transmission counts as contained.
const CONTAINMENT_INFECTION_SHARE: f64 = 0.01;

pub struct Engine {
    cfg: Config,
    seed: u64,
    rng: ChaCha8Rng,
    state: SimulationState,
    control: ControlState,
    allocations: Allocations,
    impacts: ImpactTracker,
    variants: VariantPool,
    callbacks: Vec<Box<dyn StepCallback>>,
    sink: Box<dyn EventSink>,
}

impl Engine {
    /// Engine with the default seed. Prefer [`Engine::with_seed`] when
    /// reproducibility across processes matters.
    pub fn new(cfg: Config) -> Self {
        Self::with_seed(cfg, 0)
    }

    pub fn with_seed(cfg: Config, seed: u64) -> Self {
        let state = SimulationState::new(&cfg);
        let control = ControlState::new(&cfg);
        let variants = VariantPool::from_config(&cfg);
        Engine {
            state,
            control,
            allocations: Allocations::default(),
            impacts: ImpactTracker::default(),
            variants,
            callbacks: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            sink: Box::new(NoopSink),
            cfg,
        }
    }

    /// Reinitialize every piece of run state, drop registered callbacks,
    /// and reseed the generator so the next run replays identically.
    pub fn reset(&mut self) {
        self.state = SimulationState::new(&self.cfg);
        self.control = ControlState::new(&self.cfg);
        self.allocations = Allocations::default();
        self.impacts = ImpactTracker::default();
        self.variants = VariantPool::from_config(&self.cfg);
        self.callbacks.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Replace the telemetry sink (defaults to [`NoopSink`]).
    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn is_contained(&self) -> bool {
        self.state.outbreak.contained
    }

    /// Read-only snapshot of the variant catalogue.
    pub fn variant_status(&self) -> Vec<VariantStatus> {
        self.variants.status()
    }

    // --- Intervention entry points --------------------------------------

    /// Set the lockdown severity (clamped to [0, 1]). Returns the
    /// effective level after compliance and diminishing returns.
    pub fn set_lockdown_level(&mut self, level: f64) -> f64 {
        apply_lockdown(&self.cfg, &mut self.control, &mut self.impacts, level)
    }

    /// Allocate resources (negative amounts clamp to zero; over-budget
    /// requests are scaled down). Returns the effective amount applied.
    pub fn allocate_resources(&mut self, category: ResourceCategory, amount: f64) -> f64 {
        apply_allocation(
            &self.cfg,
            &mut self.control,
            &mut self.allocations,
            &mut self.impacts,
            self.state.research.progress,
            category,
            amount,
        )
    }

    /// Enable or lift the travel restriction.
    pub fn restrict_travel(&mut self, restricted: bool) {
        apply_travel_policy(&self.cfg, &mut self.control, &mut self.impacts, restricted)
    }

    /// Register a per-step callback. Callbacks accumulate and run after
    /// every step in registration order.
    pub fn register_step_callback(&mut self, callback: Box<dyn StepCallback>) {
        self.callbacks.push(callback);
    }

    /// Closure-friendly form of [`Engine::register_step_callback`].
    pub fn register_step_fn<F>(&mut self, callback: F)
    where
        F: FnMut(StepIndex, &mut Engine) -> anyhow::Result<()> + 'static,
    {
        self.register_step_callback(Box::new(crate::strategy::CallbackFn(callback)));
    }

    // --- Step algorithm --------------------------------------------------

    /// Advance the simulation by one day.
    pub fn step(&mut self) -> &SimulationState {
        let current_step = self.state.step;

        // An extinct population cannot sustain transmission; mark the
        // run contained and skip the population math.
        if self.state.population.total <= 0.0 {
            self.mark_contained(current_step);
            self.state.step += 1;
            return &self.state;
        }

        // 1) Variant emergence + prevalence.
        let ever_infected_fraction = if self.cfg.population.initial_population > 0.0 {
            self.control.total_ever_infected / self.cfg.population.initial_population
        } else {
            0.0
        };
        self.variants
            .update(ever_infected_fraction, &self.cfg.disease, &mut self.rng);

        // 2) Aggregate variant pressure on the base strain parameters.
        let fx = self.variants.aggregate_effects();

        let disease = self.cfg.disease.clone();
        let icfg = self.cfg.interventions.clone();

        // 3) Stochastic reproduction number.
        let r0_noise = self.uniform_noise(disease.r0_variance);
        let stochastic_r0 = (self.control.current_r0 * fx.r0 + r0_noise).max(R0_FLOOR);

        // 4) Stochastic mortality.
        let mortality_noise = self.uniform_noise(disease.mortality_variance);
        let mut mortality =
            (disease.mortality_base * fx.mortality + mortality_noise).max(MORTALITY_FLOOR);

        // 5) Healthcare load: overwhelmed hospitals raise mortality,
        //    spare capacity lowers it.
        let capacity = self.control.healthcare_capacity;
        let infection_rate = self.state.infection_rate();
        let overwhelm_point = capacity * icfg.healthcare_capacity_threshold;
        if overwhelm_point > 0.0 && infection_rate > overwhelm_point {
            let overwhelm_ratio = (infection_rate / overwhelm_point).min(3.0);
            mortality *= 1.0 + icfg.healthcare_overwhelm_penalty * (overwhelm_ratio - 1.0) / 2.0;
        } else {
            let reduction = icfg.healthcare_mortality_reduction * capacity;
            mortality = (mortality * (1.0 - reduction * 0.5)).max(0.0);
        }

        // 6) Research breakthrough regime.
        let mut research_effectiveness = icfg.research_effectiveness;
        if self.state.research.progress > icfg.research_breakthrough_threshold {
            research_effectiveness *= icfg.research_breakthrough_effect;
            mortality *= 0.7;
            if self.control.healthcare_capacity > 1.0 {
                self.control.healthcare_capacity *= 1.1;
            }
        }

        // 7) Research progress from cumulative research spend.
        let progress_increment = research_effectiveness * (self.allocations.research / 100.0);
        self.state.research.progress =
            (self.state.research.progress + progress_increment).min(1.0);

        // 8) GDP drifts toward the sector-weighted health level.
        let sector_health = self.control.weighted_sector_health(&self.cfg);
        let gdp_ratio = self.state.gdp_ratio();
        let new_gdp_ratio = gdp_ratio * 0.95 + sector_health * 0.05;
        self.state.economy.current_gdp = self.state.economy.initial_gdp * new_gdp_ratio;

        // 9) SIR population flows with reinfection via immune escape.
        let infection_noise = if disease.infection_noise_width > 0.0 {
            self.rng.gen_range(
                1.0 - disease.infection_noise_width..1.0 + disease.infection_noise_width,
            )
        } else {
            1.0
        };

        let pop = &mut self.state.population;
        let effective_susceptible =
            (pop.susceptible + pop.recovered * fx.immune_escape).min(pop.total - pop.infected);

        let new_infections = stochastic_r0
            * pop.infected
            * (effective_susceptible / pop.total)
            * disease.infection_rate_scale
            * infection_noise;

        let reinfections = if fx.immune_escape > 0.0 && new_infections > 0.0 {
            (new_infections * (fx.immune_escape / (1.0 + fx.immune_escape)))
                .min(pop.recovered * fx.immune_escape)
        } else {
            0.0
        };
        let first_infections = new_infections - reinfections;

        let recoveries = if pop.infected > 0.0 {
            pop.infected / disease.recovery_period_days
        } else {
            0.0
        };
        let deaths = if pop.infected > 0.0 {
            pop.infected * mortality
        } else {
            0.0
        };

        pop.susceptible = (pop.susceptible - first_infections).max(0.0);
        pop.recovered = (pop.recovered - reinfections + recoveries).max(0.0);
        pop.infected = (pop.infected + new_infections - recoveries - deaths).max(0.0);
        pop.deaths += deaths;
        pop.total = pop.susceptible + pop.infected + pop.recovered;

        // 10) Run-level tracking.
        if pop.infected > self.state.outbreak.max_infected {
            self.state.outbreak.max_infected = pop.infected;
        }
        self.control.total_ever_infected += first_infections;

        // 11) Strategy callbacks observe the post-update state.
        self.run_callbacks(current_step);

        // 12) Containment check on the post-callback state.
        let total = self.state.population.total;
        if total > 0.0 {
            let r_effective = stochastic_r0 * (self.state.population.susceptible / total);
            let infection_share = self.state.population.infected / total;
            if r_effective < 1.0 && infection_share < CONTAINMENT_INFECTION_SHARE {
                self.mark_contained(current_step);
            }
        } else {
            self.mark_contained(current_step);
        }

        // 13) Day is done.
        self.state.step += 1;
        &self.state
    }

    /// Run the simulation for up to `steps` days.
    ///
    /// Interventions are applied once each, in order, before the loop;
    /// an intervention or callback error is logged and the run carries
    /// on. The loop stops early on containment or extinction.
    pub fn run(
        &mut self,
        steps: u64,
        mut interventions: Vec<Box<dyn Intervention>>,
    ) -> RunResult {
        for (index, intervention) in interventions.iter_mut().enumerate() {
            if let Err(err) = intervention.apply(self) {
                eprintln!("intervention {index} failed to apply: {err:#}");
            }
        }

        for _ in 0..steps {
            self.step();

            let variant_status = self.variants.status();
            self.sink
                .log_step(self.state.step - 1, &self.state, &variant_status);

            if self.state.outbreak.contained || self.state.population.total <= 0.0 {
                break;
            }
        }

        score_run(
            &self.cfg,
            &self.state,
            &self.allocations,
            &self.impacts,
            &self.variants,
            steps,
            self.seed,
            &mut self.rng,
        )
    }

    // --- Internals -------------------------------------------------------

    /// Uniform draw in (-half_width, half_width); zero width draws
    /// nothing so noise-free configs stay deterministic functions of
    /// state.
    fn uniform_noise(&mut self, half_width: f64) -> f64 {
        if half_width > 0.0 {
            self.rng.gen_range(-half_width..half_width)
        } else {
            0.0
        }
    }

    fn mark_contained(&mut self, step: StepIndex) {
        if !self.state.outbreak.contained {
            self.state.outbreak.contained = true;
            self.state.outbreak.containment_step = Some(step);
        }
    }

    /// Invoke every registered callback in registration order. A failing
    /// callback is logged and skipped; it must not halt the run. The
    /// callback list is detached during iteration so callbacks may call
    /// back into the engine (including registering further callbacks).
    fn run_callbacks(&mut self, step: StepIndex) {
        if self.callbacks.is_empty() {
            return;
        }
        let mut callbacks = std::mem::take(&mut self.callbacks);
        for callback in callbacks.iter_mut() {
            if let Err(err) = callback.on_step(step, self) {
                eprintln!("step callback failed at step {step}: {err:#}");
            }
        }
        // Callbacks registered during iteration queue up behind the
        // originals.
        callbacks.append(&mut self.callbacks);
        self.callbacks = callbacks;
    }
}
