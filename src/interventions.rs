// src/interventions.rs
//
// Intervention response functions: lockdown, resource allocation, travel
// restriction. Each applies its immediate effects to the engine-owned
// control trackers; the step algorithm reads the updated trackers on the
// *next* simulated day.
//
// Invalid inputs are clamped, never rejected; over-budget allocations are
// scaled down, never rejected.

use crate::config::Config;
use crate::state::{Allocations, ControlState, ImpactTracker};
use crate::types::ResourceCategory;

/// Set the lockdown severity dial.
///
/// Models compliance fatigue (sustained severe lockdowns erode future
/// effectiveness, floored at 50%) and diminishing returns past 30
/// recorded days. Returns the effective level actually applied, always
/// within `[0, level]`.
pub fn apply_lockdown(
    cfg: &Config,
    control: &mut ControlState,
    impacts: &mut ImpactTracker,
    level: f64,
) -> f64 {
    let icfg = &cfg.interventions;
    let level = level.clamp(0.0, 1.0);

    control.lockdown_history.push(level);
    let days = control.lockdown_history.len();

    // Compliance fatigue: decay scaled by how severe the recent window was.
    if days > icfg.fatigue_window {
        let recent = &control.lockdown_history[days - icfg.fatigue_window..];
        let avg_recent = recent.iter().sum::<f64>() / recent.len() as f64;
        let decay = icfg.lockdown_compliance_decay * (1.0 + avg_recent);
        control.compliance = (control.compliance - decay).max(icfg.compliance_floor);
    }

    let mut effective_level = level * control.compliance;

    // Diminishing returns: one multiplicative notch per full window.
    let mut diminish = 1.0;
    if days > icfg.diminishing_window {
        let notches = (days / icfg.diminishing_window) as i32;
        diminish = icfg.lockdown_diminishing_factor.powi(notches);
        effective_level *= diminish;
    }

    // Population-weighted R0 reduction across regions; urban crowds
    // comply a little worse than rural ones.
    let mut r0_reduction = 0.0;
    for region in &cfg.regions {
        let region_compliance = control.compliance * region.compliance_mult;
        let region_effective = level * region_compliance * diminish;
        r0_reduction += icfg.lockdown_r0_reduction * region_effective * region.population_share;
    }
    control.current_r0 = cfg.disease.r0_base * (1.0 - r0_reduction);

    // Sector damage scales with how exposed each sector is to contact
    // restrictions.
    for (params, health) in cfg.sectors.iter().zip(&mut control.sector_health) {
        *health = (*health - params.lockdown_impact * effective_level * 0.1).clamp(0.0, 1.0);
    }

    control.current_lockdown_level = level;
    impacts.containment += 0.1 * effective_level;

    effective_level
}

/// Allocate resources to one category.
///
/// A soft global budget: once cumulative requests exceed the cap, this
/// call's applied amount is scaled by `cap / total`. The raw requested
/// amount still enters the running totals. Returns the effective amount
/// after budget scaling and category-specific response curves.
pub fn apply_allocation(
    cfg: &Config,
    control: &mut ControlState,
    allocations: &mut Allocations,
    impacts: &mut ImpactTracker,
    research_progress: f64,
    category: ResourceCategory,
    amount: f64,
) -> f64 {
    let icfg = &cfg.interventions;
    let amount = amount.max(0.0);

    let prospective_total = allocations.total + amount;
    let mut effective = if prospective_total > icfg.resource_budget_soft_cap {
        amount * (icfg.resource_budget_soft_cap / prospective_total)
    } else {
        amount
    };

    match category {
        ResourceCategory::Healthcare => {
            // Past the saturation point every further unit buys less,
            // down to a 50% floor.
            let prior = allocations.healthcare;
            if prior > icfg.healthcare_saturation_spend {
                let effectiveness =
                    1.0 - 0.3 * (prior - icfg.healthcare_saturation_spend) / 1_000.0;
                effective *= effectiveness.max(0.5);
            }
            let capacity_increase = 0.05 * (effective / 100.0);
            control.healthcare_capacity = (control.healthcare_capacity + capacity_increase)
                .min(icfg.healthcare_capacity_cap);
            impacts.healthcare += effective * 0.01;
        }
        ResourceCategory::Economic => {
            for (params, health) in cfg.sectors.iter().zip(&mut control.sector_health) {
                let boost = params.support_coeff * (effective / 100.0);
                *health = (*health + boost).min(1.0);
            }
            impacts.economic += effective * 0.01;
        }
        ResourceCategory::Research => {
            // Accelerating returns once the groundwork is in place.
            if research_progress > 0.5 {
                effective *= 1.0 + 0.5 * research_progress;
            }
            impacts.research += effective * 0.01;
        }
    }

    allocations.add(category, amount);
    effective
}

/// Enable or lift the travel restriction.
///
/// Enabling cuts R0 region by region (urban travel matters more) and
/// penalizes contact-heavy sectors. Lifting only records the flag;
/// recovery happens through later interventions.
pub fn apply_travel_policy(
    cfg: &Config,
    control: &mut ControlState,
    impacts: &mut ImpactTracker,
    restricted: bool,
) {
    control.travel_restricted = restricted;
    if !restricted {
        return;
    }

    let icfg = &cfg.interventions;
    for region in &cfg.regions {
        let r0_impact = icfg.travel_restriction_effectiveness * region.travel_mult;
        control.current_r0 *= 1.0 - r0_impact * 0.1;
    }
    for (params, health) in cfg.sectors.iter().zip(&mut control.sector_health) {
        let impact = icfg.travel_economic_impact * params.travel_mult;
        *health = (*health * (1.0 - impact * 0.05)).clamp(0.0, 1.0);
    }

    impacts.containment += 0.05;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rig {
        cfg: Config,
        control: ControlState,
        allocations: Allocations,
        impacts: ImpactTracker,
    }

    fn rig() -> Rig {
        let cfg = Config::default();
        let control = ControlState::new(&cfg);
        Rig {
            cfg,
            control,
            allocations: Allocations::default(),
            impacts: ImpactTracker::default(),
        }
    }

    #[test]
    fn effective_level_never_exceeds_requested() {
        let mut r = rig();
        for day in 0..120 {
            let level = 0.3 + 0.7 * ((day % 10) as f64 / 10.0);
            let eff = apply_lockdown(&r.cfg, &mut r.control, &mut r.impacts, level);
            assert!(eff >= 0.0, "effective level went negative on day {day}");
            assert!(eff <= level + 1e-12, "amplified lockdown on day {day}");
        }
    }

    #[test]
    fn out_of_range_levels_are_clamped() {
        let mut r = rig();
        let eff = apply_lockdown(&r.cfg, &mut r.control, &mut r.impacts, 3.5);
        assert!(eff <= 1.0);
        assert_eq!(r.control.current_lockdown_level, 1.0);

        let eff = apply_lockdown(&r.cfg, &mut r.control, &mut r.impacts, -2.0);
        assert_eq!(eff, 0.0);
        assert_eq!(r.control.current_lockdown_level, 0.0);
    }

    #[test]
    fn compliance_decays_under_sustained_lockdown_and_floors() {
        let mut r = rig();
        for _ in 0..r.cfg.interventions.fatigue_window {
            apply_lockdown(&r.cfg, &mut r.control, &mut r.impacts, 1.0);
        }
        // Within the fatigue window, compliance is untouched.
        assert_eq!(r.control.compliance, 1.0);

        for _ in 0..500 {
            apply_lockdown(&r.cfg, &mut r.control, &mut r.impacts, 1.0);
        }
        assert_eq!(r.control.compliance, r.cfg.interventions.compliance_floor);
    }

    #[test]
    fn budget_overflow_scales_down_proportionally() {
        let mut r = rig();
        let eff = apply_allocation(
            &r.cfg,
            &mut r.control,
            &mut r.allocations,
            &mut r.impacts,
            0.0,
            ResourceCategory::Economic,
            4_000.0,
        );
        // 4000 requested against a 1000 cap: only a quarter takes effect.
        assert!((eff - 1_000.0).abs() < 1e-9);
        // The ledger still records the full request.
        assert!((r.allocations.economic - 4_000.0).abs() < 1e-9);
        assert!((r.allocations.total - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn negative_allocations_are_ignored() {
        let mut r = rig();
        let eff = apply_allocation(
            &r.cfg,
            &mut r.control,
            &mut r.allocations,
            &mut r.impacts,
            0.0,
            ResourceCategory::Healthcare,
            -50.0,
        );
        assert_eq!(eff, 0.0);
        assert_eq!(r.allocations.total, 0.0);
        assert_eq!(r.control.healthcare_capacity, 1.0);
    }

    #[test]
    fn healthcare_capacity_saturates() {
        let mut r = rig();
        for _ in 0..100 {
            apply_allocation(
                &r.cfg,
                &mut r.control,
                &mut r.allocations,
                &mut r.impacts,
                0.0,
                ResourceCategory::Healthcare,
                400.0,
            );
        }
        assert!(r.control.healthcare_capacity <= r.cfg.interventions.healthcare_capacity_cap);
    }

    #[test]
    fn travel_restriction_cuts_r0_and_sector_health() {
        let mut r = rig();
        let r0_before = r.control.current_r0;
        let health_before = r.control.sector_health.clone();

        apply_travel_policy(&r.cfg, &mut r.control, &mut r.impacts, true);

        assert!(r.control.current_r0 < r0_before);
        assert!(r.control.travel_restricted);
        for (before, after) in health_before.iter().zip(&r.control.sector_health) {
            assert!(after < before);
        }
        assert!((r.impacts.containment - 0.05).abs() < 1e-12);

        // Lifting the restriction records the flag but reverses nothing.
        let r0_restricted = r.control.current_r0;
        apply_travel_policy(&r.cfg, &mut r.control, &mut r.impacts, false);
        assert!(!r.control.travel_restricted);
        assert_eq!(r.control.current_r0, r0_restricted);
    }
}
