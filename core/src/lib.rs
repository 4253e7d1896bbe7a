//! Ad campaign simulation engine.
//!
//! Projects day-by-day results of a paid-ads campaign from its budget,
//! CPM, CTR, CVR and AOV, with seeded day-to-day volatility, a
//! start/pause/resume/reset driver, saved sessions and an advisory bridge.

pub mod activity_log;
pub mod advisory;
pub mod aggregate;
pub mod calculator;
pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event;
pub mod params;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;
