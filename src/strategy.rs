// src/strategy.rs
//
// Strategy layer: the interfaces caller-supplied policies implement, plus
// a small catalogue of preset strategies used by the CLI harness and the
// integration tests.
//
// An `Intervention` runs once before the loop starts; it typically sets
// the opening posture and registers a `StepCallback` for the dynamic
// response. Callbacks observe the state after each step and may invoke
// the intervention entry points; their changes feed the *next* step.

use anyhow::Result;

use crate::engine::Engine;
use crate::types::{ResourceCategory, StepIndex};

/// A strategy's one-time setup hook, applied before the run loop.
///
/// Errors are caught and logged by the engine; they never abort the run.
pub trait Intervention {
    fn apply(&mut self, engine: &mut Engine) -> Result<()>;
}

/// Per-step strategy hook. Callbacks accumulate in registration order and
/// are all invoked after every step.
pub trait StepCallback {
    fn on_step(&mut self, step: StepIndex, engine: &mut Engine) -> Result<()>;
}

/// Closure adapter for [`Intervention`].
pub struct InterventionFn<F>(pub F);

impl<F> Intervention for InterventionFn<F>
where
    F: FnMut(&mut Engine) -> Result<()>,
{
    fn apply(&mut self, engine: &mut Engine) -> Result<()> {
        (self.0)(engine)
    }
}

/// Closure adapter for [`StepCallback`].
pub struct CallbackFn<F>(pub F);

impl<F> StepCallback for CallbackFn<F>
where
    F: FnMut(StepIndex, &mut Engine) -> Result<()>,
{
    fn on_step(&mut self, step: StepIndex, engine: &mut Engine) -> Result<()> {
        (self.0)(step, engine)
    }
}

// --- Preset strategies ------------------------------------------------------

/// Total suppression: maximum lockdown and a healthcare-only budget until
/// the disease is all but eliminated.
pub struct ExtremeLockdown;

impl Intervention for ExtremeLockdown {
    fn apply(&mut self, engine: &mut Engine) -> Result<()> {
        engine.set_lockdown_level(1.0);
        engine.allocate_resources(ResourceCategory::Healthcare, 650.0);
        engine.restrict_travel(true);

        engine.register_step_fn(|step, engine| {
            let infection_rate = engine.state().infection_rate();
            if infection_rate > 0.000_5 {
                engine.set_lockdown_level(1.0);
                if step % 15 == 0 {
                    engine.allocate_resources(ResourceCategory::Healthcare, 50.0);
                }
            } else {
                engine.set_lockdown_level(0.9);
                if step > 300 {
                    engine.allocate_resources(ResourceCategory::Economic, 50.0);
                }
            }
            Ok(())
        });
        Ok(())
    }
}

/// No restrictions at all; every unit of budget goes to the economy
/// unless infections become catastrophic.
pub struct EconomyOnly;

impl Intervention for EconomyOnly {
    fn apply(&mut self, engine: &mut Engine) -> Result<()> {
        engine.set_lockdown_level(0.0);
        engine.allocate_resources(ResourceCategory::Economic, 650.0);
        engine.restrict_travel(false);

        engine.register_step_fn(|step, engine| {
            let infection_rate = engine.state().infection_rate();
            if infection_rate > 0.35 {
                engine.set_lockdown_level(0.1);
                engine.allocate_resources(ResourceCategory::Healthcare, 50.0);
            } else {
                engine.set_lockdown_level(0.0);
                if step % 15 == 0 {
                    engine.allocate_resources(ResourceCategory::Economic, 50.0);
                }
            }
            Ok(())
        });
        Ok(())
    }
}

/// Phased response: strong early containment, a balancing middle game,
/// and a recovery-oriented end game driven by both infection and GDP.
pub struct AdaptiveResponse;

impl Intervention for AdaptiveResponse {
    fn apply(&mut self, engine: &mut Engine) -> Result<()> {
        engine.set_lockdown_level(0.7);
        engine.allocate_resources(ResourceCategory::Healthcare, 300.0);
        engine.allocate_resources(ResourceCategory::Economic, 200.0);
        engine.restrict_travel(true);

        engine.register_step_fn(|step, engine| {
            let infection_rate = engine.state().infection_rate();
            let economic_health = engine.state().gdp_ratio();

            if step < 60 {
                if infection_rate > 0.08 {
                    engine.set_lockdown_level(0.8);
                    engine.allocate_resources(ResourceCategory::Healthcare, 70.0);
                } else if infection_rate > 0.03 {
                    engine.set_lockdown_level(0.6);
                    engine.allocate_resources(ResourceCategory::Healthcare, 50.0);
                    engine.allocate_resources(ResourceCategory::Economic, 20.0);
                } else {
                    engine.set_lockdown_level(0.5);
                    engine.allocate_resources(ResourceCategory::Economic, 50.0);
                }
            } else if step < 180 {
                if infection_rate > 0.1 {
                    engine.set_lockdown_level(0.7);
                    engine.allocate_resources(ResourceCategory::Healthcare, 60.0);
                } else if economic_health < 0.6 {
                    engine.set_lockdown_level(0.3);
                    engine.allocate_resources(ResourceCategory::Economic, 100.0);
                    engine.restrict_travel(false);
                } else {
                    engine.set_lockdown_level(0.5);
                    engine.allocate_resources(ResourceCategory::Healthcare, 40.0);
                    engine.allocate_resources(ResourceCategory::Economic, 60.0);
                    engine.restrict_travel(infection_rate > 0.03);
                }
            } else if infection_rate < 0.01 {
                engine.set_lockdown_level(0.2);
                engine.allocate_resources(ResourceCategory::Economic, 80.0);
                engine.restrict_travel(false);
            } else if economic_health < 0.5 {
                engine.set_lockdown_level(0.3);
                engine.allocate_resources(ResourceCategory::Economic, 120.0);
                engine.restrict_travel(false);
            } else {
                engine.set_lockdown_level(0.4);
                engine.allocate_resources(ResourceCategory::Healthcare, 30.0);
                engine.allocate_resources(ResourceCategory::Economic, 40.0);
                engine.restrict_travel(infection_rate > 0.05);
            }
            Ok(())
        });
        Ok(())
    }
}

/// Buy time with moderate containment while pouring the budget into
/// research, then relax once the breakthrough is within reach.
pub struct ResearchPriority;

impl Intervention for ResearchPriority {
    fn apply(&mut self, engine: &mut Engine) -> Result<()> {
        engine.set_lockdown_level(0.6);
        engine.allocate_resources(ResourceCategory::Research, 500.0);
        engine.allocate_resources(ResourceCategory::Healthcare, 150.0);
        engine.restrict_travel(true);

        engine.register_step_fn(|step, engine| {
            let infection_rate = engine.state().infection_rate();
            let progress = engine.state().research.progress;

            if progress < 0.7 {
                if step % 10 == 0 {
                    engine.allocate_resources(ResourceCategory::Research, 80.0);
                }
                if infection_rate > 0.15 {
                    engine.set_lockdown_level(0.8);
                    engine.allocate_resources(ResourceCategory::Healthcare, 50.0);
                } else {
                    engine.set_lockdown_level(0.6);
                }
            } else if infection_rate > 0.08 {
                engine.set_lockdown_level(0.5);
                engine.allocate_resources(ResourceCategory::Healthcare, 80.0);
            } else {
                engine.set_lockdown_level(0.3);
                engine.allocate_resources(ResourceCategory::Economic, 100.0);
                engine.restrict_travel(false);
            }
            Ok(())
        });
        Ok(())
    }
}

/// Preset names accepted by [`strategy_by_name`].
pub const STRATEGY_NAMES: [&str; 5] = [
    "baseline",
    "extreme-lockdown",
    "economy-only",
    "adaptive",
    "research-priority",
];

/// Look up a preset strategy. `baseline` applies no interventions at all.
pub fn strategy_by_name(name: &str) -> Option<Vec<Box<dyn Intervention>>> {
    match name {
        "baseline" => Some(Vec::new()),
        "extreme-lockdown" => Some(vec![Box::new(ExtremeLockdown)]),
        "economy-only" => Some(vec![Box::new(EconomyOnly)]),
        "adaptive" => Some(vec![Box::new(AdaptiveResponse)]),
        "research-priority" => Some(vec![Box::new(ResearchPriority)]),
        _ => None,
    }
}
