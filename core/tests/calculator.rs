//! Daily outcome calculator tests.
//!
//! Covers: the fixed no-volatility scenario, non-negativity under high
//! volatility, and unbiasedness of probabilistic rounding.

use adsim_core::{
    calculator::{calculate_day, probabilistic_round, randomize},
    clock::ManualScheduler,
    config::SimConfig,
    engine::SimEngine,
    params::SimulationParams,
    rng::{ScriptedRng, SimRng},
};

fn scenario_params() -> SimulationParams {
    SimulationParams {
        budget:     100.0,
        cpm:        25.0,
        ctr:        1.5,
        cvr:        2.0,
        aov:        85.0,
        duration:   30,
        volatility: 0.0,
    }
}

/// 4000 impressions, 60 clicks, 1.2 raw conversions every day. With a
/// coin sequence of [0.1, 0.9] the extra sale lands on odd days only.
#[test]
fn fixed_scenario_alternates_between_one_and_two_sales() {
    let mut engine = SimEngine::new(
        &SimConfig::default(),
        Box::new(ScriptedRng::flips(vec![0.1, 0.9])),
        ManualScheduler::new(),
    )
    .with_params(scenario_params());

    engine.run_to_completion();
    let days = engine.daily_data();
    assert_eq!(days.len(), 30);

    for d in days {
        assert_eq!(d.impressions, 4000, "day {}", d.day);
        assert_eq!(d.clicks, 60, "day {}", d.day);
        let expected = if d.day % 2 == 1 { 2 } else { 1 };
        assert_eq!(d.conversions, expected, "day {}", d.day);
        assert_eq!(d.revenue, expected as f64 * 85.0);
        assert_eq!(d.spend, 100.0);
        assert!((d.roas - d.revenue / 100.0).abs() < 1e-12);
    }

    let total: u64 = days.iter().map(|d| d.conversions).sum();
    assert_eq!(total, 45);
}

#[test]
fn outcomes_are_never_negative() {
    let params = SimulationParams { volatility: 50.0, ..scenario_params() };
    let mut rng = SimRng::from_seed(0xABCD);

    for day in 1..=5_000 {
        let d = calculate_day(day, &params, &mut rng);
        assert!(d.spend >= 0.0);
        assert!(d.revenue >= 0.0);
        assert!(d.roas >= 0.0 && d.roas.is_finite());
        assert_eq!(d.revenue, d.conversions as f64 * params.aov);
    }
}

#[test]
fn volatility_bounds_the_spread() {
    let mut rng = SimRng::from_seed(5);
    for _ in 0..5_000 {
        let v = randomize(20.0, 10.0, &mut rng);
        assert!((18.0..=22.0).contains(&v), "randomized value out of ±10%: {v}");
    }
    // Zero volatility is the identity.
    assert_eq!(randomize(20.0, 0.0, &mut rng), 20.0);
}

#[test]
fn probabilistic_rounding_handles_edges() {
    let mut always = ScriptedRng::flips(vec![0.0]);
    let mut never = ScriptedRng::flips(vec![0.999]);

    assert_eq!(probabilistic_round(0.0, &mut always), 0);
    assert_eq!(probabilistic_round(-3.0, &mut always), 0);
    assert_eq!(probabilistic_round(f64::NAN, &mut always), 0);
    assert_eq!(probabilistic_round(3.0, &mut always), 3);
    assert_eq!(probabilistic_round(3.4, &mut always), 4);
    assert_eq!(probabilistic_round(3.4, &mut never), 3);
}

/// Average sales per day over many seeded runs converge to the expected
/// clicks * cvr / 100 = 1.2; plain flooring would give 1.0.
#[test]
fn probabilistic_rounding_is_unbiased() {
    let config = SimConfig::default();
    let mut total = 0u64;
    let mut days = 0u64;

    for seed in 0..200 {
        let mut engine = SimEngine::build(&config, seed).with_params(scenario_params());
        engine.run_to_completion();
        total += engine.daily_data().iter().map(|d| d.conversions).sum::<u64>();
        days += engine.daily_data().len() as u64;
    }

    let mean = total as f64 / days as f64;
    assert!((mean - 1.2).abs() < 0.03, "mean conversions per day {mean} not near 1.2");
}

#[test]
fn zero_budget_gives_zero_roas() {
    let params = SimulationParams { budget: 0.0, ..scenario_params() };
    let mut rng = SimRng::from_seed(1);
    let d = calculate_day(1, &params, &mut rng);
    assert_eq!(d.spend, 0.0);
    assert_eq!(d.roas, 0.0);
    assert_eq!(d.conversions, 0);
}

#[test]
fn zero_cpm_yields_no_impressions() {
    let params = SimulationParams { cpm: 0.0, ..scenario_params() };
    let mut rng = SimRng::from_seed(1);
    let d = calculate_day(1, &params, &mut rng);
    assert_eq!(d.impressions, 0);
    assert_eq!(d.clicks, 0);
    assert_eq!(d.revenue, 0.0);
}
