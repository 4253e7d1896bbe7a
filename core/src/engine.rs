//! The simulation driver.
//!
//! STATE MACHINE:
//!   Idle/Completed --start--> Running  (Completed resets first)
//!   Running        --pause--> Paused
//!   Paused        --resume--> Running
//!   Running  --final day---> Completed (auto-stops)
//!   any            --reset--> Idle     (clears days, log, advice)
//!
//! RULES:
//!   - One day per fired tick; a tick that fires while not Running, or
//!     that was never scheduled, does nothing.
//!   - Parameters are re-read on every tick. Edits never touch days
//!     already recorded.
//!   - All randomness flows through the engine's RandomSource.
//!   - The engine never touches the session store.

use crate::{
    activity_log::{format_day, LogPolicy, SimulationLog, SimulationLogItem},
    aggregate::{self, ChartPoint, SimulationTotals},
    calculator::{calculate_day, DailyData},
    clock::{ManualScheduler, RunState, SimClock, TickScheduler},
    config::SimConfig,
    event::SimEvent,
    params::{Currency, ParamBounds, ParamModel, ParamName, SimulationParams},
    rng::{RandomSource, SimRng},
    types::{Day, Generation},
};

pub struct SimEngine<S: TickScheduler = ManualScheduler> {
    pub clock:     SimClock,
    inputs:        ParamModel,
    rng:           Box<dyn RandomSource>,
    scheduler:     S,
    daily:         Vec<DailyData>,
    log:           SimulationLog,
    log_policy:    LogPolicy,
    advisory_text: Option<String>,
}

impl SimEngine<ManualScheduler> {
    /// Seeded engine with a manual scheduler. Call this in tests and
    /// fast-forward tooling.
    pub fn build(config: &SimConfig, seed: u64) -> Self {
        SimEngine::new(config, Box::new(SimRng::from_seed(seed)), ManualScheduler::new())
    }
}

impl<S: TickScheduler> SimEngine<S> {
    pub fn new(config: &SimConfig, rng: Box<dyn RandomSource>, scheduler: S) -> Self {
        Self {
            clock: SimClock::new(),
            inputs: ParamModel::new(
                config.default_params,
                config.default_currency,
                config.units.clone(),
                config.exchange_rate,
            ),
            rng,
            scheduler,
            daily: Vec::new(),
            log: SimulationLog::new(config.log_capacity),
            log_policy: config.log_policy,
            advisory_text: None,
        }
    }

    /// Start from the given parameters instead of the configured defaults.
    pub fn with_params(mut self, params: SimulationParams) -> Self {
        self.inputs.replace(params);
        self
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<SimEvent> {
        match self.clock.state {
            RunState::Running => vec![],
            RunState::Paused => self.resume(),
            RunState::Completed => {
                let mut events = self.reset();
                events.extend(self.begin());
                events
            }
            RunState::Idle => self.begin(),
        }
    }

    fn begin(&mut self) -> Vec<SimEvent> {
        self.clock.state = RunState::Running;
        self.scheduler.schedule_next_tick();
        log::debug!("run started (generation {})", self.clock.generation);
        vec![SimEvent::RunStarted { generation: self.clock.generation }]
    }

    pub fn pause(&mut self) -> Vec<SimEvent> {
        if !self.clock.is_running() {
            return vec![];
        }
        self.scheduler.cancel_pending_tick();
        self.clock.state = RunState::Paused;
        log::debug!("run paused at day {}", self.clock.current_day);
        vec![SimEvent::RunPaused { day: self.clock.current_day }]
    }

    pub fn resume(&mut self) -> Vec<SimEvent> {
        if self.clock.state != RunState::Paused {
            return vec![];
        }
        self.clock.state = RunState::Running;
        self.scheduler.schedule_next_tick();
        log::debug!("run resumed at day {}", self.clock.current_day);
        vec![SimEvent::RunResumed { day: self.clock.current_day }]
    }

    /// Cancel the pending tick and clear the run in one step.
    pub fn reset(&mut self) -> Vec<SimEvent> {
        self.scheduler.cancel_pending_tick();
        self.clock.reset();
        self.daily.clear();
        self.log.clear();
        self.advisory_text = None;
        log::debug!("run reset (generation {})", self.clock.generation);
        vec![SimEvent::RunReset { generation: self.clock.generation }]
    }

    /// Timer callback: simulate the next day.
    pub fn on_tick(&mut self) -> Vec<SimEvent> {
        if !self.scheduler.take_pending_tick() || !self.clock.is_running() {
            return vec![];
        }

        let params = *self.inputs.params();
        if self.clock.current_day >= params.duration {
            return self.complete();
        }

        let day = self.clock.advance();
        let outcome = calculate_day(day, &params, &mut *self.rng).accumulate(self.daily.last());
        self.daily.push(outcome);

        let mut events = vec![SimEvent::DaySimulated {
            day,
            spend:       outcome.spend,
            revenue:     outcome.revenue,
            conversions: outcome.conversions,
        }];

        if self.log_policy.should_log(&outcome) {
            let kind = self.log_policy.classify(&outcome);
            let message = format_day(&outcome, self.inputs.currency());
            if let Some(id) = self.log.push(day, message, kind) {
                events.push(SimEvent::LogWritten { id, day, kind });
            }
        }

        log::debug!(
            "day={day} spend={:.2} conversions={} revenue={:.2} roas={:.2}",
            outcome.spend, outcome.conversions, outcome.revenue, outcome.roas
        );

        if day >= params.duration {
            events.extend(self.complete());
        } else {
            self.scheduler.schedule_next_tick();
        }
        events
    }

    fn complete(&mut self) -> Vec<SimEvent> {
        self.scheduler.cancel_pending_tick();
        self.clock.state = RunState::Completed;
        let totals = self.totals();
        log::debug!(
            "run completed at day {}: revenue={:.2} roas={:.2}",
            self.clock.current_day, totals.revenue, totals.roas
        );
        vec![SimEvent::RunCompleted { day: self.clock.current_day, totals }]
    }

    /// Fire up to `n` ticks, stopping early once nothing is pending.
    pub fn run_ticks(&mut self, n: u64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            if !self.scheduler.has_pending_tick() {
                break;
            }
            events.extend(self.on_tick());
        }
        events
    }

    /// Start (or resume) and fire ticks until the run stops.
    pub fn run_to_completion(&mut self) -> Vec<SimEvent> {
        let mut events = self.start();
        while self.scheduler.has_pending_tick() {
            events.extend(self.on_tick());
        }
        events
    }

    pub fn set_param(&mut self, name: ParamName, value: f64) -> bool {
        self.inputs.set_param(name, value)
    }

    pub fn replace_params(&mut self, params: SimulationParams) {
        self.inputs.replace(params);
    }

    pub fn convert_currency(&mut self, target: Currency) -> bool {
        self.inputs.convert_currency(target)
    }

    /// Attach advisory text, unless the run it was requested for has
    /// since been reset.
    pub fn set_advisory_text(&mut self, generation: Generation, text: String) -> bool {
        if generation != self.clock.generation {
            log::warn!(
                "discarding advisory for generation {generation} (current {})",
                self.clock.generation
            );
            return false;
        }
        self.advisory_text = Some(text);
        true
    }

    pub fn clear_advisory_text(&mut self) {
        self.advisory_text = None;
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn state(&self) -> RunState { self.clock.state }
    pub fn current_day(&self) -> Day { self.clock.current_day }
    pub fn generation(&self) -> Generation { self.clock.generation }
    pub fn params(&self) -> &SimulationParams { self.inputs.params() }
    pub fn currency(&self) -> Currency { self.inputs.currency() }
    pub fn bounds(&self, name: ParamName) -> ParamBounds { self.inputs.bounds(name) }
    pub fn daily_data(&self) -> &[DailyData] { &self.daily }
    pub fn log(&self) -> &SimulationLog { &self.log }
    pub fn log_entries(&self) -> Vec<SimulationLogItem> { self.log.newest_first() }
    pub fn advisory_text(&self) -> Option<&str> { self.advisory_text.as_deref() }
    pub fn scheduler(&self) -> &S { &self.scheduler }
    pub fn tick_pending(&self) -> bool { self.scheduler.has_pending_tick() }

    pub fn totals(&self) -> SimulationTotals {
        aggregate::totals(self.inputs.params(), &self.daily)
    }

    pub fn projection(&self) -> SimulationTotals {
        aggregate::static_projection(self.inputs.params())
    }

    pub fn chart(&self) -> Vec<ChartPoint> {
        aggregate::chart_series(self.inputs.params(), &self.daily)
    }
}
