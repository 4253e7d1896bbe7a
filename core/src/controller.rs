//! The simulator controller.
//!
//! Owns the engine, the session store and the user's actual-results
//! entry. Hosts talk to the simulator only through its commands and the
//! `snapshot()` read model.

use crate::{
    advisory::{AdvisoryRequest, AdvisoryService, AdvisoryTicket},
    clock::{ManualScheduler, TickScheduler},
    command::SimCommand,
    config::SimConfig,
    engine::SimEngine,
    error::SimResult,
    event::SimEvent,
    params::{Currency, ParamName},
    session::{compare, ActualResults, SessionStore, SimulationSession},
    snapshot::SimSnapshot,
    store::SimStore,
    types::{Generation, SessionId},
};

/// What applying a command produced.
#[derive(Debug, Default)]
pub struct CommandOutcome {
    pub events:   Vec<SimEvent>,
    /// Set by `Analyze`: the host performs the request off the tick loop
    /// and hands the result back through `complete_advisory`.
    pub advisory: Option<AdvisoryTicket>,
}

impl From<Vec<SimEvent>> for CommandOutcome {
    fn from(events: Vec<SimEvent>) -> Self {
        Self { events, advisory: None }
    }
}

pub struct Simulator<S: TickScheduler = ManualScheduler> {
    engine:           SimEngine<S>,
    sessions:         SessionStore,
    actual:           Option<ActualResults>,
    advisory_pending: Option<Generation>,
    failure_message:  String,
}

impl Simulator<ManualScheduler> {
    /// Seeded simulator over an in-memory session store (tests, demos).
    pub fn in_memory(config: &SimConfig, seed: u64) -> SimResult<Self> {
        let sessions = SessionStore::open(SimStore::in_memory()?)?;
        Ok(Simulator::new(config, SimEngine::build(config, seed), sessions))
    }
}

impl<S: TickScheduler> Simulator<S> {
    pub fn new(config: &SimConfig, engine: SimEngine<S>, sessions: SessionStore) -> Self {
        Self {
            engine,
            sessions,
            actual: None,
            advisory_pending: None,
            failure_message: config.advisory.failure_message.clone(),
        }
    }

    pub fn engine(&self) -> &SimEngine<S> { &self.engine }

    // ── Run control ────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<SimEvent> { self.engine.start() }
    pub fn pause(&mut self) -> Vec<SimEvent> { self.engine.pause() }
    pub fn resume(&mut self) -> Vec<SimEvent> { self.engine.resume() }
    pub fn reset(&mut self) -> Vec<SimEvent> { self.engine.reset() }
    pub fn on_tick(&mut self) -> Vec<SimEvent> { self.engine.on_tick() }
    pub fn run_ticks(&mut self, n: u64) -> Vec<SimEvent> { self.engine.run_ticks(n) }
    pub fn run_to_completion(&mut self) -> Vec<SimEvent> { self.engine.run_to_completion() }

    // ── Inputs ─────────────────────────────────────────────────

    pub fn set_param(&mut self, name: ParamName, value: f64) -> bool {
        self.engine.set_param(name, value)
    }

    pub fn convert_currency(&mut self, target: Currency) -> bool {
        self.engine.convert_currency(target)
    }

    /// Record real-world results. Invalid values are ignored.
    pub fn set_actual_results(&mut self, spend: f64, revenue: f64) -> bool {
        match ActualResults::new(spend, revenue) {
            Some(actual) => {
                self.actual = Some(actual);
                true
            }
            None => {
                log::warn!("ignoring invalid actual results: spend={spend} revenue={revenue}");
                false
            }
        }
    }

    pub fn clear_actual_results(&mut self) {
        self.actual = None;
    }

    pub fn actual_results(&self) -> Option<ActualResults> {
        self.actual
    }

    // ── Sessions ───────────────────────────────────────────────

    pub fn sessions(&self) -> &[SimulationSession] {
        self.sessions.sessions()
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.sessions.current_id()
    }

    /// Save the current inputs and totals (live or projected).
    pub fn save_session(&mut self) -> SimResult<SessionId> {
        let params = *self.engine.params();
        let totals = self.engine.totals();
        let saved = self.sessions.save(&params, &totals, self.actual)?;
        Ok(saved.id.clone())
    }

    /// Restore a session's inputs and actual results, then reset the run.
    /// The session's projected run is not replayed.
    pub fn load_session(&mut self, id: &str) -> SimResult<Vec<SimEvent>> {
        let session = self.sessions.load(id)?;
        self.engine.replace_params(session.params);
        self.actual = session.actual_results;
        Ok(self.engine.reset())
    }

    pub fn delete_session(&mut self, id: &str) -> SimResult<bool> {
        self.sessions.delete(id)
    }

    // ── Advisory ───────────────────────────────────────────────

    /// Package the current run for the advisory service. None before
    /// the first simulated day, and while a request for this run is
    /// still outstanding.
    pub fn begin_advisory(&mut self) -> Option<AdvisoryTicket> {
        if self.engine.daily_data().is_empty() {
            return None;
        }
        if self.advisory_pending() {
            log::debug!("advisory already pending for generation {}", self.engine.generation());
            return None;
        }
        self.engine.clear_advisory_text();
        let generation = self.engine.generation();
        self.advisory_pending = Some(generation);
        Some(AdvisoryTicket {
            generation,
            request: AdvisoryRequest {
                simulation_params: *self.engine.params(),
                daily_data:        self.engine.daily_data().to_vec(),
            },
        })
    }

    /// Apply an advisory result. Failures become the fixed failure
    /// message. Returns false if the run was reset in the meantime and
    /// the result was discarded.
    pub fn complete_advisory(&mut self, ticket: AdvisoryTicket, result: SimResult<String>) -> bool {
        if self.advisory_pending == Some(ticket.generation) {
            self.advisory_pending = None;
        }
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                log::warn!("advisory failed: {e}");
                self.failure_message.clone()
            }
        };
        self.engine.set_advisory_text(ticket.generation, text)
    }

    /// Run the advisory request inline. For hosts without a background
    /// worker; blocks until the service answers.
    pub fn analyze_with(&mut self, service: &dyn AdvisoryService) -> bool {
        match self.begin_advisory() {
            Some(ticket) => {
                let result = service.analyze(&ticket.request);
                self.complete_advisory(ticket, result)
            }
            None => false,
        }
    }

    pub fn advisory_pending(&self) -> bool {
        self.advisory_pending == Some(self.engine.generation())
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply(&mut self, command: SimCommand) -> SimResult<CommandOutcome> {
        log::debug!("command: {command:?}");
        let outcome = match command {
            SimCommand::Start => self.start().into(),
            SimCommand::Pause => self.pause().into(),
            SimCommand::Resume => self.resume().into(),
            SimCommand::Reset => self.reset().into(),
            SimCommand::Tick { count } => self.run_ticks(count).into(),
            SimCommand::SetParam { name, value } => {
                self.set_param(name, value);
                CommandOutcome::default()
            }
            SimCommand::ConvertCurrency { currency } => {
                self.convert_currency(currency);
                CommandOutcome::default()
            }
            SimCommand::SetActualResults { spend, revenue } => {
                self.set_actual_results(spend, revenue);
                CommandOutcome::default()
            }
            SimCommand::ClearActualResults => {
                self.clear_actual_results();
                CommandOutcome::default()
            }
            SimCommand::SaveSession => {
                self.save_session()?;
                CommandOutcome::default()
            }
            SimCommand::LoadSession { id } => self.load_session(&id)?.into(),
            SimCommand::DeleteSession { id } => {
                self.delete_session(&id)?;
                CommandOutcome::default()
            }
            SimCommand::Analyze => CommandOutcome {
                events:   Vec::new(),
                advisory: self.begin_advisory(),
            },
        };
        Ok(outcome)
    }

    // ── Read model ─────────────────────────────────────────────

    pub fn snapshot(&self) -> SimSnapshot {
        let totals = self.engine.totals();
        SimSnapshot {
            state:              self.engine.state(),
            current_day:        self.engine.current_day(),
            currency:           self.engine.currency(),
            params:             *self.engine.params(),
            totals,
            projection:         self.engine.projection(),
            daily_data:         self.engine.daily_data().to_vec(),
            chart:              self.engine.chart(),
            log:                self.engine.log_entries(),
            advisory_text:      self.engine.advisory_text().map(str::to_string),
            advisory_pending:   self.advisory_pending(),
            current_session_id: self.sessions.current_id().map(str::to_string),
            actual_results:     self.actual,
            comparison:         self.actual.as_ref().map(|a| compare(&totals, a)),
        }
    }
}
