//! Configuration loading tests.

use adsim_core::{
    config::SimConfig,
    params::{Currency, ParamModel, ParamName, SimulationParams, UnitTable},
};

fn data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn shipped_config_matches_built_in_defaults() {
    let loaded = SimConfig::load(&data_dir()).expect("load data/simulator.json");
    let defaults = SimConfig::default();

    assert_eq!(loaded.default_params, SimulationParams::default());
    assert_eq!(loaded.default_currency, Currency::Usd);
    assert_eq!(loaded.exchange_rate, defaults.exchange_rate);
    assert_eq!(loaded.units, UnitTable::default());
    assert_eq!(loaded.tick_interval_ms, 50);
    assert_eq!(loaded.log_capacity, 50);
    assert_eq!(loaded.log_policy, defaults.log_policy);
    assert_eq!(loaded.advisory.failure_message, defaults.advisory.failure_message);
}

#[test]
fn missing_directory_names_the_file() {
    let err = SimConfig::load("/definitely/not/here").unwrap_err();
    assert!(err.to_string().contains("simulator.json"), "unhelpful error: {err}");
}

#[test]
fn validation_rejects_bad_values() {
    let mut config = SimConfig::default();
    config.exchange_rate = 0.0;
    assert!(config.validate().is_err());

    let mut config = SimConfig::default();
    config.units.cop.cpm.min = 60_000.0;
    assert!(config.validate().is_err());

    assert!(SimConfig::default().validate().is_ok());
}

#[test]
fn validation_checks_every_bounds_row() {
    let mut config = SimConfig::default();
    config.units.ctr.min = 5.0;
    config.units.ctr.max = 0.1;
    assert!(config.validate().is_err(), "inverted ctr bounds accepted");

    let mut config = SimConfig::default();
    config.units.volatility.max = f64::NAN;
    assert!(config.validate().is_err(), "NaN volatility bound accepted");

    let mut config = SimConfig::default();
    config.units.duration.min = f64::INFINITY;
    assert!(config.validate().is_err());

    let mut config = SimConfig::default();
    config.log_capacity = 0;
    assert!(config.validate().is_err());
}

#[test]
fn inverted_bounds_never_panic_when_clamping() {
    let mut units = UnitTable::default();
    units.ctr.min = 5.0;
    units.ctr.max = 0.1;
    units.cvr.max = f64::NAN;
    let mut model = ParamModel::new(SimulationParams::default(), Currency::Usd, units, 4000.0);

    assert!(model.set_param(ParamName::Ctr, 1.0));
    assert!(model.params().ctr.is_finite());
    assert!(model.set_param(ParamName::Cvr, 3.0));
    assert_eq!(model.params().cvr, 3.0);
}
