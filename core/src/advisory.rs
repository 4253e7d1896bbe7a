//! Advisory bridge: send a finished (or partial) run to an external
//! advice generator and get plain text back.
//!
//! The call may take seconds, so it never runs inside the tick loop.
//! The controller hands out an `AdvisoryTicket` stamped with the run
//! generation; the host performs the request wherever it likes and
//! returns the result with the ticket. Results for a run that has since
//! been reset are dropped.

use crate::{
    calculator::DailyData,
    config::AdvisoryConfig,
    error::{SimError, SimResult},
    params::SimulationParams,
    types::Generation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub simulation_params: SimulationParams,
    pub daily_data:        Vec<DailyData>,
}

/// A pending advisory request, tied to the run it was made for.
#[derive(Debug, Clone)]
pub struct AdvisoryTicket {
    pub generation: Generation,
    pub request:    AdvisoryRequest,
}

pub trait AdvisoryService: Send + Sync {
    fn analyze(&self, request: &AdvisoryRequest) -> SimResult<String>;
}

/// Posts the request as JSON to a webhook and reads back the advice.
pub struct WebhookAdvisor {
    url:   String,
    agent: ureq::Agent,
}

impl WebhookAdvisor {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url:   url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl AdvisoryService for WebhookAdvisor {
    fn analyze(&self, request: &AdvisoryRequest) -> SimResult<String> {
        let body = serde_json::to_value(request)?;
        let response = self
            .agent
            .post(&self.url)
            .set("User-Agent", "adsim-advisory")
            .send_json(body)
            .map_err(|e| SimError::Advisory(e.to_string()))?;
        let text = response
            .into_string()
            .map_err(|e| SimError::Advisory(e.to_string()))?;
        extract_advice(&text)
    }
}

/// Webhooks answer either with plain text or with JSON carrying the text
/// under `output`/`text` (optionally wrapped in a one-element array).
pub fn extract_advice(body: &str) -> SimResult<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(SimError::Advisory("empty response".into()));
    }

    let field = |v: &serde_json::Value| -> Option<String> {
        ["output", "text", "advice"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|s| s.as_str()))
            .map(str::to_string)
    };

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => items
            .first()
            .and_then(field)
            .ok_or_else(|| SimError::Advisory("no advice field in response".into())),
        Ok(v @ serde_json::Value::Object(_)) => {
            field(&v).ok_or_else(|| SimError::Advisory("no advice field in response".into()))
        }
        _ => Ok(trimmed.to_string()),
    }
}

/// Local stand-in when no webhook is configured: summarises the series.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCoach;

impl AdvisoryService for OfflineCoach {
    fn analyze(&self, request: &AdvisoryRequest) -> SimResult<String> {
        let days = &request.daily_data;
        let spend: f64 = days.iter().map(|d| d.spend).sum();
        let revenue: f64 = days.iter().map(|d| d.revenue).sum();
        let conversions: u64 = days.iter().map(|d| d.conversions).sum();
        let roas = if spend > 0.0 { revenue / spend } else { 0.0 };
        let verdict = if roas >= 1.0 { "profitable" } else { "losing money" };

        let mut out = format!(
            "**Offline analysis** ({} of {} days)\n\n- ROAS: {roas:.2}x ({verdict})\n- Spend: {spend:.0}\n- Revenue: {revenue:.0}\n- Sales: {conversions}\n",
            days.len(),
            request.simulation_params.duration,
        );
        if let Some(best) = days.iter().max_by(|a, b| a.revenue.total_cmp(&b.revenue)) {
            out.push_str(&format!("- Best day: {} ({:.0} revenue)\n", best.day, best.revenue));
        }
        if roas < 1.0 {
            out.push_str("\nCheck CPM and conversion rate before scaling the budget.\n");
        }
        Ok(out)
    }
}

pub fn advisor_from_config(config: &AdvisoryConfig) -> Box<dyn AdvisoryService> {
    match &config.webhook_url {
        Some(url) => Box::new(WebhookAdvisor::new(
            url.clone(),
            Duration::from_secs(config.timeout_secs),
        )),
        None => Box::new(OfflineCoach),
    }
}
