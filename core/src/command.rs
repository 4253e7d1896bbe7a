use crate::params::{Currency, ParamName};
use serde::{Deserialize, Serialize};

/// Every command a host can issue to the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SimCommand {
    // ── Run control ───────────────────────────────
    Start,
    Pause,
    Resume,
    Reset,
    /// Fire up to `count` pending ticks immediately.
    Tick { count: u64 },

    // ── Inputs ────────────────────────────────────
    SetParam { name: ParamName, value: f64 },
    ConvertCurrency { currency: Currency },
    SetActualResults { spend: f64, revenue: f64 },
    ClearActualResults,

    // ── Sessions ──────────────────────────────────
    SaveSession,
    LoadSession { id: String },
    DeleteSession { id: String },

    // ── Advisory ──────────────────────────────────
    Analyze,
}
