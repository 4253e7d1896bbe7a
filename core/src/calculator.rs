//! Daily outcome calculator.
//!
//! Pure mapping from one day's parameters plus random draws to one
//! simulated day. Budget is the chosen spend and is never randomized;
//! CPM, CTR and CVR each get an independent multiplicative offset
//! bounded by the volatility percentage.

use crate::{params::SimulationParams, rng::RandomSource, types::Day};
use serde::{Deserialize, Serialize};

/// One simulated day. Never mutated after it is appended to a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyData {
    pub day:         Day,
    pub spend:       f64,
    pub revenue:     f64,
    pub impressions: u64,
    pub clicks:      u64,
    pub conversions: u64,
    pub roas:        f64,
    pub cum_revenue: f64,
    pub cum_spend:   f64,
}

impl DailyData {
    pub fn profit(&self) -> f64 {
        self.revenue - self.spend
    }

    /// Fill the cumulative fields from the previous day, or from zero
    /// when this is the first day of the run.
    pub fn accumulate(mut self, prev: Option<&DailyData>) -> Self {
        let (rev, spend) = prev.map_or((0.0, 0.0), |p| (p.cum_revenue, p.cum_spend));
        self.cum_revenue = rev + self.revenue;
        self.cum_spend = spend + self.spend;
        self
    }
}

/// `base` shifted by up to ±volatility%, floored at zero.
/// Volatility 0 returns `base` without consuming a draw.
pub fn randomize(base: f64, volatility: f64, rng: &mut dyn RandomSource) -> f64 {
    if volatility <= 0.0 {
        return base;
    }
    let offset = rng.uniform() * base * (volatility / 100.0);
    (base + offset).max(0.0)
}

/// Round a non-negative fractional count to an integer without bias:
/// the floor, plus one with probability equal to the remainder.
pub fn probabilistic_round(raw: f64, rng: &mut dyn RandomSource) -> u64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let base = raw.floor();
    let remainder = raw - base;
    let extra = if remainder > 0.0 && rng.chance(remainder) { 1 } else { 0 };
    base as u64 + extra
}

/// Simulate one day. Cumulative fields are left at zero; the driver
/// fills them with `DailyData::accumulate` at append time.
pub fn calculate_day(day: Day, params: &SimulationParams, rng: &mut dyn RandomSource) -> DailyData {
    let cpm = randomize(params.cpm, params.volatility, rng);
    let ctr = randomize(params.ctr, params.volatility, rng);
    let cvr = randomize(params.cvr, params.volatility, rng);
    let spend = params.budget.max(0.0);

    let impressions = if cpm > 0.0 { spend / cpm * 1000.0 } else { 0.0 };
    let clicks = impressions * (ctr / 100.0);
    let conversions = probabilistic_round(clicks * (cvr / 100.0), rng);
    let revenue = conversions as f64 * params.aov.max(0.0);

    DailyData {
        day,
        spend,
        revenue,
        impressions: impressions.floor() as u64,
        clicks:      clicks.floor() as u64,
        conversions,
        roas:        if spend > 0.0 { revenue / spend } else { 0.0 },
        cum_revenue: 0.0,
        cum_spend:   0.0,
    }
}
