//! Simulation clock: run state, day counter and tick scheduling.
//!
//! Ticks are logical. A scheduler only decides *whether* a tick is due;
//! the engine advances one day per fired tick regardless of how much
//! wall time actually elapsed.

use crate::types::{Day, Generation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run started, or fully reset.
    Idle,
    Running,
    /// Stopped mid-run; resumable.
    Paused,
    /// Reached the configured duration.
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_day: Day,
    pub state:       RunState,
    pub generation:  Generation,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            current_day: 0,
            state:       RunState::Idle,
            generation:  0,
        }
    }

    /// Advance one day. Returns the new day number.
    /// Panics if the clock is not running; callers must check.
    pub fn advance(&mut self) -> Day {
        assert_eq!(self.state, RunState::Running, "advance() called on a stopped clock");
        self.current_day += 1;
        self.current_day
    }

    /// Back to day 0 and Idle; invalidates anything tied to the old run.
    pub fn reset(&mut self) {
        self.current_day = 0;
        self.state = RunState::Idle;
        self.generation += 1;
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }
}

impl Default for SimClock {
    fn default() -> Self { Self::new() }
}

/// Owns the single pending tick of a run.
///
/// At most one tick is pending at a time. The engine schedules the next
/// tick after each recorded day and cancels on pause, reset and
/// completion, so no stray tick can fire afterwards.
pub trait TickScheduler {
    fn schedule_next_tick(&mut self);
    fn cancel_pending_tick(&mut self);
    fn has_pending_tick(&self) -> bool;

    /// Consume the pending tick as it fires. Returns false when nothing
    /// was pending, in which case the callback must do nothing.
    fn take_pending_tick(&mut self) -> bool {
        let pending = self.has_pending_tick();
        self.cancel_pending_tick();
        pending
    }
}

/// Scheduler without a timer: ticks fire only when the caller asks.
/// Used by tests and fast-forward runs.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending:   bool,
    scheduled: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self { Self::default() }

    /// Times a tick was scheduled.
    pub fn scheduled_count(&self) -> u64 { self.scheduled }

    /// Times a pending tick was cancelled before firing.
    pub fn cancelled_count(&self) -> u64 { self.cancelled }
}

impl TickScheduler for ManualScheduler {
    fn schedule_next_tick(&mut self) {
        self.pending = true;
        self.scheduled += 1;
    }

    fn cancel_pending_tick(&mut self) {
        if self.pending {
            self.cancelled += 1;
        }
        self.pending = false;
    }

    fn has_pending_tick(&self) -> bool { self.pending }

    fn take_pending_tick(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }
}

/// Fixed-cadence wall-clock scheduler. The host loop sleeps for
/// `time_until_due()` and then fires the tick.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    due:      Option<Instant>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval, due: None }
    }

    /// How long until the pending tick is due; None when nothing is pending.
    pub fn time_until_due(&self) -> Option<Duration> {
        self.due.map(|at| at.saturating_duration_since(Instant::now()))
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule_next_tick(&mut self) {
        self.due = Some(Instant::now() + self.interval);
    }

    fn cancel_pending_tick(&mut self) {
        self.due = None;
    }

    fn has_pending_tick(&self) -> bool { self.due.is_some() }

    fn take_pending_tick(&mut self) -> bool {
        self.due.take().is_some()
    }
}
