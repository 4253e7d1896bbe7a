//! Events emitted by the engine as the run progresses.
//!
//! The engine returns these from every tick so a host (the runner, a UI
//! bridge) can react without polling the whole read model.

use crate::{
    activity_log::LogKind,
    aggregate::SimulationTotals,
    types::{Day, Generation, LogId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Lifecycle ──────────────────────────────────
    RunStarted {
        generation: Generation,
    },
    RunPaused {
        day: Day,
    },
    RunResumed {
        day: Day,
    },
    RunReset {
        generation: Generation,
    },
    RunCompleted {
        day:    Day,
        totals: SimulationTotals,
    },

    // ── Per tick ───────────────────────────────────
    DaySimulated {
        day:         Day,
        spend:       f64,
        revenue:     f64,
        conversions: u64,
    },
    LogWritten {
        id:   LogId,
        day:  Day,
        kind: LogKind,
    },
}

impl SimEvent {
    /// Stable name of the variant, for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. }   => "run_started",
            Self::RunPaused { .. }    => "run_paused",
            Self::RunResumed { .. }   => "run_resumed",
            Self::RunReset { .. }     => "run_reset",
            Self::RunCompleted { .. } => "run_completed",
            Self::DaySimulated { .. } => "day_simulated",
            Self::LogWritten { .. }   => "log_written",
        }
    }
}
