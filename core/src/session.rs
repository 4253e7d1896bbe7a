//! Saved simulation sessions.
//!
//! A session is a named snapshot of the inputs, the totals they produced
//! and, optionally, the real-world results the campaign later achieved.
//! Sessions are independent of the live run: saving reads the current
//! params/totals, loading only restores inputs.
//!
//! Every mutation rewrites the whole collection through `SimStore`.
//! The in-memory copy only changes once the write has succeeded.

use crate::{
    aggregate::SimulationTotals,
    error::{SimError, SimResult},
    params::SimulationParams,
    store::SimStore,
    types::SessionId,
};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Real spend and revenue entered after the campaign ran.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ActualResults {
    pub spend:   f64,
    pub revenue: f64,
}

impl ActualResults {
    /// None unless both values are finite and non-negative.
    pub fn new(spend: f64, revenue: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        (valid(spend) && valid(revenue)).then_some(Self { spend, revenue })
    }

    pub fn roas(&self) -> f64 {
        if self.spend > 0.0 { self.revenue / self.spend } else { 0.0 }
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.spend
    }
}

/// Actual results measured against a projection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActualComparison {
    pub actual_roas:      f64,
    pub projected_roas:   f64,
    pub actual_profit:    f64,
    pub projected_profit: f64,
    /// actual - projected
    pub spend_variance:   f64,
    /// actual - projected
    pub revenue_variance: f64,
}

pub fn compare(projected: &SimulationTotals, actual: &ActualResults) -> ActualComparison {
    ActualComparison {
        actual_roas:      actual.roas(),
        projected_roas:   projected.roas,
        actual_profit:    actual.profit(),
        projected_profit: projected.profit,
        spend_variance:   actual.spend - projected.spend,
        revenue_variance: actual.revenue - projected.revenue,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSession {
    pub id:                SessionId,
    pub name:              String,
    pub date:              DateTime<Utc>,
    pub params:            SimulationParams,
    pub projected_results: SimulationTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_results:    Option<ActualResults>,
}

pub fn default_session_name(now: DateTime<Utc>) -> String {
    format!("Simulation {}", now.with_timezone(&Local).format("%Y-%m-%d %H:%M"))
}

pub struct SessionStore {
    store:    SimStore,
    sessions: Vec<SimulationSession>,
    current:  Option<SessionId>,
}

impl SessionStore {
    /// Migrate the store and read the saved collection once.
    pub fn open(store: SimStore) -> SimResult<Self> {
        store.migrate()?;
        let sessions = store.load_sessions()?;
        log::info!("loaded {} saved session(s)", sessions.len());
        Ok(Self { store, sessions, current: None })
    }

    /// Newest first.
    pub fn sessions(&self) -> &[SimulationSession] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&SimulationSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn save(
        &mut self,
        params: &SimulationParams,
        totals: &SimulationTotals,
        actual: Option<ActualResults>,
    ) -> SimResult<&SimulationSession> {
        self.save_at(params, totals, actual, Utc::now())
    }

    /// Update the bound session in place (keeping its id and name), or
    /// create a new one and bind it.
    pub fn save_at(
        &mut self,
        params: &SimulationParams,
        totals: &SimulationTotals,
        actual: Option<ActualResults>,
        now: DateTime<Utc>,
    ) -> SimResult<&SimulationSession> {
        let mut next = self.sessions.clone();
        let bound = self
            .current
            .as_ref()
            .and_then(|id| next.iter().position(|s| &s.id == id));

        let index = match bound {
            Some(i) => {
                let existing = &mut next[i];
                existing.date = now;
                existing.params = *params;
                existing.projected_results = *totals;
                existing.actual_results = actual;
                i
            }
            None => {
                next.insert(0, SimulationSession {
                    id:                uuid::Uuid::new_v4().to_string(),
                    name:              default_session_name(now),
                    date:              now,
                    params:            *params,
                    projected_results: *totals,
                    actual_results:    actual,
                });
                0
            }
        };

        self.store.replace_sessions(&next)?;
        self.sessions = next;
        let saved = &self.sessions[index];
        log::info!("saved session {} ({})", saved.id, saved.name);
        self.current = Some(saved.id.clone());
        Ok(&self.sessions[index])
    }

    /// Bind `id` as the current session and return a copy of it.
    pub fn load(&mut self, id: &str) -> SimResult<SimulationSession> {
        let session = self
            .get(id)
            .cloned()
            .ok_or_else(|| SimError::SessionNotFound { id: id.to_string() })?;
        self.current = Some(session.id.clone());
        log::info!("loaded session {} ({})", session.id, session.name);
        Ok(session)
    }

    /// Remove a session. Unbinds it if it was current; no other session
    /// is loaded in its place. Returns false for an unknown id.
    pub fn delete(&mut self, id: &str) -> SimResult<bool> {
        let next: Vec<SimulationSession> =
            self.sessions.iter().filter(|s| s.id != id).cloned().collect();
        if next.len() == self.sessions.len() {
            return Ok(false);
        }
        self.store.replace_sessions(&next)?;
        self.sessions = next;
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        log::info!("deleted session {id}");
        Ok(true)
    }

    /// Forget the current binding so the next save creates a new session.
    pub fn unbind(&mut self) {
        self.current = None;
    }
}
