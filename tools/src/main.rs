//! adsim-runner: headless runner for the ad campaign simulator.
//!
//! Usage:
//!   adsim-runner --seed 12345 --budget 150 --duration 30
//!   adsim-runner --fast --save --db sessions.db --analyze
//!   adsim-runner --ipc-mode --db sessions.db

use adsim_core::{
    advisory::{advisor_from_config, AdvisoryService, AdvisoryTicket},
    clock::IntervalScheduler,
    command::SimCommand,
    config::SimConfig,
    controller::Simulator,
    engine::SimEngine,
    error::SimResult,
    event::SimEvent,
    params::{Currency, ParamName},
    rng::SimRng,
    session::SessionStore,
    store::SimStore,
};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

type Runner = Simulator<IntervalScheduler>;

/// Everything the IPC loop can be woken by.
enum Inbound {
    Line(String),
    Eof,
    Advice(AdvisoryTicket, SimResult<String>),
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let fast = has_flag(&args, "--fast");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    let config = load_config(data_dir)?;
    let interval = if fast {
        Duration::ZERO
    } else {
        Duration::from_millis(config.tick_interval_ms)
    };

    let store = if db == ":memory:" {
        SimStore::in_memory()?
    } else {
        SimStore::open(db).with_context(|| format!("opening session db {db}"))?
    };
    let sessions = SessionStore::open(store)?;
    let engine = SimEngine::new(
        &config,
        Box::new(SimRng::from_seed(seed)),
        IntervalScheduler::new(interval),
    );
    let mut sim = Simulator::new(&config, engine, sessions);
    let advisor: Arc<dyn AdvisoryService> = Arc::from(advisor_from_config(&config.advisory));

    if ipc_mode {
        return run_ipc_loop(&mut sim, advisor);
    }

    println!("Ad campaign simulator - adsim-runner");
    println!("  seed:      {seed}");
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!();

    if let Some(code) = string_arg(&args, "--currency") {
        let currency: Currency = code.parse()?;
        sim.convert_currency(currency);
    }
    for name in ParamName::ALL {
        if let Some(value) = string_arg(&args, &format!("--{}", name.as_str())) {
            let value: f64 = value
                .parse()
                .with_context(|| format!("--{} expects a number", name.as_str()))?;
            sim.set_param(name, value);
        }
    }

    sim.start();
    while let Some(wait) = sim.engine().scheduler().time_until_due() {
        thread::sleep(wait);
        for event in sim.on_tick() {
            match event {
                SimEvent::DaySimulated { day, conversions, revenue, .. } => {
                    log::info!("day {day}: {conversions} sales, revenue {revenue:.0}");
                }
                other => log::debug!("event: {}", other.type_name()),
            }
        }
    }

    print_summary(&sim);

    if has_flag(&args, "--save") {
        let id = sim.save_session()?;
        println!("  saved session: {id}");
    }

    if has_flag(&args, "--analyze") {
        if let Some(ticket) = sim.begin_advisory() {
            // Off the driver's thread, as a UI host would do it.
            let request = ticket.request.clone();
            let worker = Arc::clone(&advisor);
            let handle = thread::spawn(move || worker.analyze(&request));
            let result = handle
                .join()
                .map_err(|_| anyhow::anyhow!("advisory worker panicked"))?;
            sim.complete_advisory(ticket, result);
        }
        if let Some(text) = sim.engine().advisory_text() {
            println!();
            println!("=== ADVISORY ===");
            println!("{text}");
        }
    }

    Ok(())
}

fn load_config(data_dir: &str) -> Result<SimConfig> {
    if Path::new(data_dir).join("simulator.json").exists() {
        SimConfig::load(data_dir)
    } else {
        log::warn!("no simulator.json in {data_dir}; using built-in defaults");
        let mut config = SimConfig::default();
        config.apply_env();
        Ok(config)
    }
}

/// Line-oriented JSON protocol: one command per stdin line, one JSON
/// answer per stdout line. Besides the simulator commands it accepts
/// `{"cmd":"get_state"}` and `{"cmd":"quit"}`.
fn run_ipc_loop(sim: &mut Runner, advisor: Arc<dyn AdvisoryService>) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Inbound>();

    let stdin_tx = tx.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) => {
                    if stdin_tx.send(Inbound::Line(l)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = stdin_tx.send(Inbound::Eof);
    });

    let mut stdout = io::stdout();
    loop {
        let inbound = match sim.engine().scheduler().time_until_due() {
            Some(wait) => match rx.recv_timeout(wait) {
                Ok(msg) => Some(msg),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            },
        };

        match inbound {
            // The pending tick is due.
            None => {
                let events = sim.on_tick();
                for event in &events {
                    log::debug!("event: {}", event.type_name());
                }
                if !events.is_empty() {
                    writeln!(stdout, "{}", serde_json::json!({ "events": events }))?;
                }
            }
            Some(Inbound::Eof) => break,
            Some(Inbound::Advice(ticket, result)) => {
                sim.complete_advisory(ticket, result);
                writeln!(stdout, "{}", serde_json::to_string(&sim.snapshot())?)?;
            }
            Some(Inbound::Line(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let value: serde_json::Value = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                        stdout.flush()?;
                        continue;
                    }
                };
                match value.get("cmd").and_then(|c| c.as_str()) {
                    Some("quit") => break,
                    Some("get_state") => {}
                    _ => {
                        if let Err(e) = handle_command(sim, value, &advisor, &tx) {
                            writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                            stdout.flush()?;
                            continue;
                        }
                    }
                }
                writeln!(stdout, "{}", serde_json::to_string(&sim.snapshot())?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    sim: &mut Runner,
    value: serde_json::Value,
    advisor: &Arc<dyn AdvisoryService>,
    tx: &mpsc::Sender<Inbound>,
) -> Result<()> {
    let command: SimCommand = serde_json::from_value(value)?;
    let outcome = sim.apply(command)?;
    if let Some(ticket) = outcome.advisory {
        let worker = Arc::clone(advisor);
        let tx = tx.clone();
        thread::spawn(move || {
            let result = worker.analyze(&ticket.request);
            let _ = tx.send(Inbound::Advice(ticket, result));
        });
    }
    Ok(())
}

fn print_summary(sim: &Runner) {
    let engine = sim.engine();
    let totals = engine.totals();
    let projection = engine.projection();
    let currency = engine.currency();

    println!("=== RUN SUMMARY ===");
    println!("  state:        {:?}", engine.state());
    println!("  days run:     {}/{}", engine.current_day(), engine.params().duration);
    println!("  currency:     {currency}");
    println!("  spend:        {:.0}", totals.spend);
    println!("  revenue:      {:.0}", totals.revenue);
    println!("  profit:       {:.0}", totals.profit);
    println!("  roas:         {:.2}x", totals.roas);
    println!("  sales:        {:.0}", totals.conversions);
    println!("  cpa:          {:.2}", totals.cpa);
    println!();
    println!("=== PROJECTION (expected) ===");
    println!("  revenue:      {:.0}", projection.revenue);
    println!("  roas:         {:.2}x", projection.roas);
    println!("  sales:        {:.1}", projection.conversions);
    println!();
    println!("=== RECENT LOG ===");
    let entries = engine.log_entries();
    if entries.is_empty() {
        println!("  (no entries)");
    }
    for entry in entries.iter().take(10) {
        println!("  [{:?}] {}", entry.kind, entry.message);
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
