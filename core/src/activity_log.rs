//! Capped activity log shown next to the running simulation.
//!
//! Entries are written on day 1, on every weekly boundary, and on any day
//! with at least one sale. Only the most recent `capacity` entries are
//! kept; the oldest is evicted first.

use crate::{
    calculator::DailyData,
    params::Currency,
    types::{Day, LogId},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Success,
    Neutral,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationLogItem {
    pub id:      LogId,
    pub day:     Day,
    pub message: String,
    #[serde(rename = "type")]
    pub kind:    LogKind,
}

/// When a day earns a log line, and how it is classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LogPolicy {
    /// A line is written every `weekly_interval` days.
    pub weekly_interval:        Day,
    /// A day losing more than this is a warning.
    pub loss_warning_threshold: f64,
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self { weekly_interval: 7, loss_warning_threshold: 50.0 }
    }
}

impl LogPolicy {
    pub fn should_log(&self, day: &DailyData) -> bool {
        day.day == 1
            || (self.weekly_interval > 0 && day.day % self.weekly_interval == 0)
            || day.conversions >= 1
    }

    pub fn classify(&self, day: &DailyData) -> LogKind {
        let profit = day.profit();
        if profit > 0.0 {
            LogKind::Success
        } else if profit < -self.loss_warning_threshold {
            LogKind::Warning
        } else {
            LogKind::Neutral
        }
    }
}

pub fn format_day(day: &DailyData, currency: Currency) -> String {
    let prefix = currency.money_prefix();
    format!(
        "Day {}: spend {prefix}{:.0} -> {} sales ({prefix}{:.0})",
        day.day, day.spend, day.conversions, day.revenue
    )
}

#[derive(Debug, Clone)]
pub struct SimulationLog {
    entries:  VecDeque<SimulationLogItem>,
    capacity: usize,
    next_id:  LogId,
}

impl SimulationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Append an entry, evicting the oldest when full. Ids keep
    /// increasing across `clear()` so they stay unique for a UI list.
    /// Returns None when the log keeps nothing (capacity 0).
    pub fn push(&mut self, day: Day, message: String, kind: LogKind) -> Option<LogId> {
        if self.capacity == 0 {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(SimulationLogItem { id, day, message, kind });
        Some(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first.
    pub fn newest_first(&self) -> Vec<SimulationLogItem> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SimulationLogItem> {
        self.entries.iter()
    }
}

impl Default for SimulationLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
