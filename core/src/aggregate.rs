//! Totals and chart series.
//!
//! Totals come from the live DailyData sequence when at least one day
//! has run, otherwise from the closed-form static projection. Both paths
//! derive roas, profit and cpa through `SimulationTotals::derive`, so
//! they agree whenever they see the same spend/revenue/conversions.

use crate::{calculator::DailyData, params::SimulationParams, types::Day};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimulationTotals {
    pub spend:       f64,
    pub revenue:     f64,
    pub roas:        f64,
    pub profit:      f64,
    /// Real-valued for projections (an expectation), whole for live runs.
    pub conversions: f64,
    pub cpa:         f64,
}

impl SimulationTotals {
    /// Derive the ratio fields. Zero denominators yield 0, never NaN.
    pub fn derive(spend: f64, revenue: f64, conversions: f64) -> Self {
        Self {
            spend,
            revenue,
            roas:   if spend > 0.0 { revenue / spend } else { 0.0 },
            profit: revenue - spend,
            conversions,
            cpa:    if conversions > 0.0 { spend / conversions } else { 0.0 },
        }
    }
}

/// Expected totals for the whole campaign, without running the tick loop.
pub fn static_projection(params: &SimulationParams) -> SimulationTotals {
    let spend = params.budget * params.duration as f64;
    let impressions = if params.cpm > 0.0 { spend / params.cpm * 1000.0 } else { 0.0 };
    let clicks = impressions * params.ctr / 100.0;
    let conversions = clicks * params.cvr / 100.0;
    let revenue = conversions * params.aov;
    SimulationTotals::derive(spend, revenue, conversions)
}

/// Totals over the days simulated so far; None before the first tick.
pub fn live_totals(daily: &[DailyData]) -> Option<SimulationTotals> {
    let last = daily.last()?;
    let conversions: u64 = daily.iter().map(|d| d.conversions).sum();
    Some(SimulationTotals::derive(last.cum_spend, last.cum_revenue, conversions as f64))
}

pub fn totals(params: &SimulationParams, daily: &[DailyData]) -> SimulationTotals {
    live_totals(daily).unwrap_or_else(|| static_projection(params))
}

/// One point of the cumulative chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub day:             Day,
    pub cum_spend:       f64,
    pub cum_revenue:     f64,
    pub cum_conversions: f64,
}

/// Cumulative series for charting. Before any day has run this is a
/// straight projection line from day 1 (all zero) to the final day.
pub fn chart_series(params: &SimulationParams, daily: &[DailyData]) -> Vec<ChartPoint> {
    if daily.is_empty() {
        let p = static_projection(params);
        return vec![
            ChartPoint { day: 1, cum_spend: 0.0, cum_revenue: 0.0, cum_conversions: 0.0 },
            ChartPoint {
                day:             params.duration,
                cum_spend:       p.spend,
                cum_revenue:     p.revenue,
                cum_conversions: p.conversions,
            },
        ];
    }

    let mut conversions = 0u64;
    daily
        .iter()
        .map(|d| {
            conversions += d.conversions;
            ChartPoint {
                day:             d.day,
                cum_spend:       d.cum_spend,
                cum_revenue:     d.cum_revenue,
                cum_conversions: conversions as f64,
            }
        })
        .collect()
}
