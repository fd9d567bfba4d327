// tests/scoring_tests.rs
//
// End-of-run scoring exercised through the public run() surface:
// degenerate step budgets, single-step runs, containment bonuses, and
// unit-range guarantees across the preset strategies.

use epidemica::{strategy_by_name, Config, Engine, STRATEGY_NAMES};

#[test]
fn single_step_baseline_run_scores_cleanly() {
    let mut e = Engine::with_seed(Config::default(), 42);
    let result = e.run(1, Vec::new());

    // One day of deaths barely dents a 10k population.
    assert!(result.population_survived > 0.995);
    assert!(result.population_survived < 1.0);

    // 1% of the population has ever been infected: far below every
    // variant's emergence threshold.
    assert_eq!(result.variants_emerged, 0);
    assert!(result.variant_names.is_empty());
    assert_eq!(result.variant_control, 1.0);

    // Not contained, nothing spent.
    assert_eq!(result.time_to_containment, 0.0);
    assert_eq!(result.resource_efficiency, 0.0);
    assert!((0.0..=1.0).contains(&result.final_score));
}

#[test]
fn zero_step_run_returns_a_well_formed_result() {
    let mut e = Engine::with_seed(Config::default(), 42);
    let result = e.run(0, Vec::new());

    for component in [
        result.population_survived,
        result.gdp_preserved,
        result.infection_control,
        result.resource_efficiency,
        result.time_to_containment,
        result.variant_control,
        result.raw_score,
        result.normalized_score,
        result.final_score,
    ] {
        assert!(component.is_finite());
        assert!((0.0..=1.0).contains(&component));
    }

    assert_eq!(result.population_survived, 1.0);
    assert_eq!(result.gdp_preserved, 1.0);
    // max_infected stays at the 100 initially infected.
    assert!((result.infection_control - 0.99).abs() < 1e-9);
    assert!(!result.contained);
    assert_eq!(result.containment_step, None);

    // The record must serialize for downstream reporting.
    serde_json::to_string(&result).unwrap();
}

#[test]
fn preset_strategies_score_within_the_unit_range() {
    for name in STRATEGY_NAMES {
        let mut e = Engine::with_seed(Config::default(), 123);
        let result = e.run(365, strategy_by_name(name).unwrap());
        assert!(
            (0.0..=1.0).contains(&result.final_score),
            "strategy {name} scored {}",
            result.final_score
        );
        assert!(result.raw_score <= 1.0);
        assert!(result.raw_score >= 0.0);
    }
}

#[test]
fn mild_outbreak_reaches_containment_and_earns_the_time_bonus() {
    let mut cfg = Config::default().with_zero_noise();
    cfg.disease.r0_base = 0.6;

    let mut e = Engine::with_seed(cfg, 2);
    let result = e.run(100, Vec::new());

    assert!(result.contained);
    assert!(result.containment_step.is_some());
    assert!(result.time_to_containment > 0.0);
    // The loop stopped as soon as containment was reached.
    assert!(e.state().step < 100);
}

#[test]
fn spending_is_reflected_in_resource_efficiency() {
    // Balanced, under-budget spending scores higher than one-sided
    // over-budget spending.
    let balanced = {
        let mut e = Engine::with_seed(Config::default(), 50);
        use epidemica::ResourceCategory::*;
        e.allocate_resources(Healthcare, 300.0);
        e.allocate_resources(Economic, 300.0);
        e.allocate_resources(Research, 300.0);
        e.run(30, Vec::new()).resource_efficiency
    };
    let lopsided = {
        let mut e = Engine::with_seed(Config::default(), 50);
        use epidemica::ResourceCategory::*;
        e.allocate_resources(Healthcare, 3_000.0);
        e.run(30, Vec::new()).resource_efficiency
    };

    assert!(balanced > lopsided);
    assert!((0.0..=1.0).contains(&balanced));
    assert!((0.0..=1.0).contains(&lopsided));
}
