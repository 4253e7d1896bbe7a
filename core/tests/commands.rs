//! Command surface and read model tests.

use adsim_core::{
    clock::RunState,
    command::SimCommand,
    config::SimConfig,
    controller::Simulator,
    params::{Currency, ParamName},
};

fn build() -> Simulator {
    Simulator::in_memory(&SimConfig::default(), 21).expect("simulator")
}

#[test]
fn commands_parse_from_ipc_json() {
    let cmd: SimCommand =
        serde_json::from_str(r#"{"cmd":"set_param","name":"budget","value":150}"#).unwrap();
    assert_eq!(cmd, SimCommand::SetParam { name: ParamName::Budget, value: 150.0 });

    let cmd: SimCommand =
        serde_json::from_str(r#"{"cmd":"convert_currency","currency":"COP"}"#).unwrap();
    assert_eq!(cmd, SimCommand::ConvertCurrency { currency: Currency::Cop });

    let cmd: SimCommand = serde_json::from_str(r#"{"cmd":"tick","count":3}"#).unwrap();
    assert_eq!(cmd, SimCommand::Tick { count: 3 });
}

#[test]
fn a_scripted_session_through_commands() {
    let mut sim = build();
    sim.apply(SimCommand::SetParam { name: ParamName::Duration, value: 10.0 }).unwrap();
    sim.apply(SimCommand::Start).unwrap();
    let outcome = sim.apply(SimCommand::Tick { count: 4 }).unwrap();
    assert!(!outcome.events.is_empty());
    sim.apply(SimCommand::Pause).unwrap();
    sim.apply(SimCommand::SetActualResults { spend: 400.0, revenue: 500.0 }).unwrap();
    sim.apply(SimCommand::SaveSession).unwrap();

    let snap = sim.snapshot();
    assert_eq!(snap.state, RunState::Paused);
    assert_eq!(snap.current_day, 4);
    assert_eq!(snap.daily_data.len(), 4);
    assert_eq!(snap.chart.len(), 4);
    assert!(snap.current_session_id.is_some());
    assert!(snap.comparison.is_some());

    let id = snap.current_session_id.clone().unwrap();
    sim.apply(SimCommand::Resume).unwrap();
    sim.apply(SimCommand::Tick { count: 100 }).unwrap();
    assert_eq!(sim.snapshot().state, RunState::Completed);
    assert_eq!(sim.snapshot().daily_data.len(), 10);

    sim.apply(SimCommand::LoadSession { id: id.clone() }).unwrap();
    assert_eq!(sim.snapshot().state, RunState::Idle);
    sim.apply(SimCommand::DeleteSession { id }).unwrap();
    assert!(sim.sessions().is_empty());
    assert!(sim.apply(SimCommand::LoadSession { id: "gone".into() }).is_err());
}

#[test]
fn snapshot_before_any_run_shows_the_projection() {
    let sim = build();
    let snap = sim.snapshot();
    assert_eq!(snap.state, RunState::Idle);
    assert_eq!(snap.totals, snap.projection);
    assert!(snap.daily_data.is_empty());
    assert!(snap.log.is_empty());
    assert_eq!(snap.chart.len(), 2);

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["state"], "idle");
    assert_eq!(json["currency"], "USD");
    assert!(json.get("currentSessionId").is_some());
}

#[test]
fn currency_command_rescales_inputs() {
    let mut sim = build();
    sim.apply(SimCommand::ConvertCurrency { currency: Currency::Cop }).unwrap();
    let snap = sim.snapshot();
    assert_eq!(snap.currency, Currency::Cop);
    assert_eq!(snap.params.budget, 400_000.0);
}
