//! Shared primitive types used across the entire simulation.

/// A simulated day. Day 1 is the first day of a campaign; day 0 means
/// no day has been simulated yet.
pub type Day = u32;

/// A stable, unique identifier for a saved simulation session.
pub type SessionId = String;

/// Monotonic identifier of an activity log entry.
pub type LogId = u64;

/// Run generation. Bumped on every reset so late results from an
/// earlier run can be recognised and dropped.
pub type Generation = u64;
