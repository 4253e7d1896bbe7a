//! Activity log tests: write rule, classification, text and the cap.

use adsim_core::{
    activity_log::{format_day, LogKind, LogPolicy, SimulationLog},
    calculator::DailyData,
    clock::ManualScheduler,
    config::SimConfig,
    engine::SimEngine,
    event::SimEvent,
    params::{Currency, SimulationParams},
    rng::ScriptedRng,
};

fn no_volatility(cvr: f64, ctr: f64, duration: u32) -> SimulationParams {
    SimulationParams {
        budget: 100.0,
        cpm: 25.0,
        ctr,
        cvr,
        aov: 85.0,
        duration,
        volatility: 0.0,
    }
}

fn scripted_engine(params: SimulationParams) -> SimEngine {
    SimEngine::new(
        &SimConfig::default(),
        Box::new(ScriptedRng::flips(vec![0.5])),
        ManualScheduler::new(),
    )
    .with_params(params)
}

fn sample_day(day: u32, revenue: f64, conversions: u64) -> DailyData {
    DailyData {
        day,
        spend: 100.0,
        revenue,
        impressions: 4000,
        clicks: 60,
        conversions,
        roas: revenue / 100.0,
        cum_revenue: revenue,
        cum_spend: 100.0,
    }
}

#[test]
fn days_without_sales_log_on_day_one_and_weekly() {
    // cvr 0 -> no sales at all.
    let mut engine = scripted_engine(no_volatility(0.0, 1.5, 30));
    engine.run_to_completion();

    let mut days: Vec<u32> = engine.log().iter().map(|e| e.day).collect();
    days.sort_unstable();
    assert_eq!(days, vec![1, 7, 14, 21, 28]);
    assert!(
        engine.log().iter().all(|e| e.kind == LogKind::Warning),
        "a 100 loss is past the 50 warning threshold"
    );
}

#[test]
fn every_day_with_a_sale_is_logged() {
    let mut engine = scripted_engine(no_volatility(2.0, 1.5, 10));
    engine.run_to_completion();
    assert_eq!(engine.log().len(), 10);
}

#[test]
fn log_is_capped_and_evicts_oldest_first() {
    // 200 clicks * 10% = 20 sales every day.
    let mut engine = scripted_engine(no_volatility(10.0, 5.0, 90));
    engine.run_to_completion();

    let entries = engine.log_entries();
    assert_eq!(entries.len(), 50);
    assert_eq!(entries.first().map(|e| e.day), Some(90), "newest first");
    assert_eq!(entries.last().map(|e| e.day), Some(41), "days 1-40 evicted");
    assert!(entries.windows(2).all(|w| w[0].id > w[1].id), "ids are monotonic");
    assert!(entries.iter().all(|e| e.kind == LogKind::Success));
}

#[test]
fn ring_buffer_never_exceeds_capacity() {
    let mut log = SimulationLog::new(3);
    for day in 1..=10 {
        log.push(day, format!("entry {day}"), LogKind::Neutral);
        assert!(log.len() <= 3);
    }
    let kept: Vec<u32> = log.iter().map(|e| e.day).collect();
    assert_eq!(kept, vec![8, 9, 10]);

    log.clear();
    let id = log.push(11, "after clear".into(), LogKind::Neutral);
    assert_eq!(id, Some(11), "ids keep increasing across clear");
}

#[test]
fn classification_thresholds() {
    let policy = LogPolicy::default();
    assert_eq!(policy.classify(&sample_day(2, 170.0, 2)), LogKind::Success);
    assert_eq!(policy.classify(&sample_day(2, 85.0, 1)), LogKind::Neutral);
    assert_eq!(policy.classify(&sample_day(2, 50.0, 1)), LogKind::Neutral);
    assert_eq!(policy.classify(&sample_day(2, 0.0, 0)), LogKind::Warning);

    assert!(policy.should_log(&sample_day(1, 0.0, 0)));
    assert!(policy.should_log(&sample_day(14, 0.0, 0)));
    assert!(policy.should_log(&sample_day(3, 85.0, 1)));
    assert!(!policy.should_log(&sample_day(3, 0.0, 0)));
}

#[test]
fn message_uses_currency_prefix() {
    let d = sample_day(3, 170.0, 2);
    assert_eq!(format_day(&d, Currency::Usd), "Day 3: spend $100 -> 2 sales ($170)");
    assert_eq!(format_day(&d, Currency::Cop), "Day 3: spend COP 100 -> 2 sales (COP 170)");
}

#[test]
fn log_item_serializes_kind_as_type() {
    let mut log = SimulationLog::default();
    log.push(1, "Day 1".into(), LogKind::Success);
    let json = serde_json::to_value(log.newest_first()).unwrap();
    assert_eq!(json[0]["type"], "success");
    assert_eq!(json[0]["day"], 1);
}

#[test]
fn zero_capacity_log_reports_no_entries() {
    let config = SimConfig { log_capacity: 0, ..SimConfig::default() };
    let mut engine = SimEngine::new(
        &config,
        Box::new(ScriptedRng::flips(vec![0.5])),
        ManualScheduler::new(),
    )
    .with_params(no_volatility(2.0, 1.5, 7));
    let events = engine.run_to_completion();

    assert!(engine.log().is_empty());
    assert!(
        !events.iter().any(|e| matches!(e, SimEvent::LogWritten { .. })),
        "log event emitted for an entry that was not stored"
    );
    assert_eq!(SimulationLog::new(0).push(1, "dropped".into(), LogKind::Neutral), None);
}
