//! Campaign parameter model.
//!
//! Holds the seven campaign assumptions plus the active currency, and
//! enforces each field's bounds. Money fields (budget, CPM, AOV) have one
//! bounds row per currency; the rate fields (CTR, CVR), duration and
//! volatility are currency-independent.
//!
//! There is no cross-field validation: each field is clamped on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "COP")]
    Cop,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cop => "COP",
        }
    }

    /// Prefix used when rendering money amounts in log text.
    pub fn money_prefix(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Cop => "COP ",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Usd => Self::Cop,
            Self::Cop => Self::Usd,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "COP" => Ok(Self::Cop),
            other => Err(anyhow::anyhow!("Unknown currency: {other}")),
        }
    }
}

/// Names of the seven tunable campaign parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParamName {
    Budget,
    Cpm,
    Ctr,
    Cvr,
    Aov,
    Duration,
    Volatility,
}

impl ParamName {
    pub const ALL: [ParamName; 7] = [
        Self::Budget,
        Self::Cpm,
        Self::Ctr,
        Self::Cvr,
        Self::Aov,
        Self::Duration,
        Self::Volatility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget     => "budget",
            Self::Cpm        => "cpm",
            Self::Ctr        => "ctr",
            Self::Cvr        => "cvr",
            Self::Aov        => "aov",
            Self::Duration   => "duration",
            Self::Volatility => "volatility",
        }
    }
}

impl FromStr for ParamName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown parameter: {s}"))
    }
}

/// Campaign assumptions for one simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationParams {
    /// Daily spend, in the active currency.
    pub budget:     f64,
    /// Cost per 1000 impressions.
    pub cpm:        f64,
    /// Click-through rate, percent.
    pub ctr:        f64,
    /// Conversion rate, percent.
    pub cvr:        f64,
    /// Average order value.
    pub aov:        f64,
    /// Campaign length in days, at least 1.
    pub duration:   u32,
    /// Day-to-day spread of CPM/CTR/CVR, percent in [0, 50].
    pub volatility: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            budget:     100.0,
            cpm:        25.0,
            ctr:        1.5,
            cvr:        2.0,
            aov:        85.0,
            duration:   30,
            volatility: 10.0,
        }
    }
}

pub const MAX_VOLATILITY: f64 = 50.0;

impl SimulationParams {
    pub fn get(&self, name: ParamName) -> f64 {
        match name {
            ParamName::Budget     => self.budget,
            ParamName::Cpm        => self.cpm,
            ParamName::Ctr        => self.ctr,
            ParamName::Cvr        => self.cvr,
            ParamName::Aov        => self.aov,
            ParamName::Duration   => self.duration as f64,
            ParamName::Volatility => self.volatility,
        }
    }

    fn put(&mut self, name: ParamName, value: f64) {
        match name {
            ParamName::Budget     => self.budget = value,
            ParamName::Cpm        => self.cpm = value,
            ParamName::Ctr        => self.ctr = value,
            ParamName::Cvr        => self.cvr = value,
            ParamName::Aov        => self.aov = value,
            ParamName::Duration   => self.duration = value.round().max(1.0) as u32,
            ParamName::Volatility => self.volatility = value,
        }
    }

    /// Enforce the structural invariants only: every numeric field is a
    /// finite value >= 0, duration >= 1, volatility <= 50. Valid inputs
    /// pass through bit-for-bit.
    pub fn sanitized(mut self) -> Self {
        for f in [
            &mut self.budget,
            &mut self.cpm,
            &mut self.ctr,
            &mut self.cvr,
            &mut self.aov,
            &mut self.volatility,
        ] {
            if !f.is_finite() || *f < 0.0 {
                *f = 0.0;
            }
        }
        self.volatility = self.volatility.min(MAX_VOLATILITY);
        self.duration = self.duration.max(1);
        self
    }
}

/// Inclusive range plus the UI slider step for one parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ParamBounds {
    pub min:  f64,
    pub max:  f64,
    pub step: f64,
}

impl ParamBounds {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Never panics: an inverted or NaN bound degrades to the other one.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Money bounds for one currency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MoneyBounds {
    pub budget: ParamBounds,
    pub cpm:    ParamBounds,
    pub aov:    ParamBounds,
}

/// Bounds lookup table: one money row per currency, shared rows for the
/// currency-independent fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitTable {
    pub usd:        MoneyBounds,
    pub cop:        MoneyBounds,
    pub ctr:        ParamBounds,
    pub cvr:        ParamBounds,
    pub duration:   ParamBounds,
    pub volatility: ParamBounds,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            usd: MoneyBounds {
                budget: ParamBounds::new(10.0, 1_000.0, 10.0),
                cpm:    ParamBounds::new(1.0, 100.0, 1.0),
                aov:    ParamBounds::new(10.0, 500.0, 5.0),
            },
            cop: MoneyBounds {
                budget: ParamBounds::new(40_000.0, 5_000_000.0, 10_000.0),
                cpm:    ParamBounds::new(4_000.0, 50_000.0, 1_000.0),
                aov:    ParamBounds::new(40_000.0, 1_000_000.0, 5_000.0),
            },
            ctr:        ParamBounds::new(0.1, 5.0, 0.1),
            cvr:        ParamBounds::new(0.1, 10.0, 0.1),
            duration:   ParamBounds::new(7.0, 90.0, 1.0),
            volatility: ParamBounds::new(0.0, MAX_VOLATILITY, 5.0),
        }
    }
}

impl UnitTable {
    pub fn money(&self, currency: Currency) -> &MoneyBounds {
        match currency {
            Currency::Usd => &self.usd,
            Currency::Cop => &self.cop,
        }
    }

    pub fn bounds(&self, currency: Currency, name: ParamName) -> ParamBounds {
        let money = self.money(currency);
        match name {
            ParamName::Budget     => money.budget,
            ParamName::Cpm        => money.cpm,
            ParamName::Aov        => money.aov,
            ParamName::Ctr        => self.ctr,
            ParamName::Cvr        => self.cvr,
            ParamName::Duration   => self.duration,
            ParamName::Volatility => self.volatility,
        }
    }
}

/// The live parameter state read by the driver on every tick.
#[derive(Debug, Clone)]
pub struct ParamModel {
    params:        SimulationParams,
    currency:      Currency,
    table:         UnitTable,
    /// Units of COP per 1 USD.
    exchange_rate: f64,
}

impl ParamModel {
    pub fn new(
        params: SimulationParams,
        currency: Currency,
        table: UnitTable,
        exchange_rate: f64,
    ) -> Self {
        Self {
            params: params.sanitized(),
            currency,
            table,
            exchange_rate,
        }
    }

    pub fn params(&self) -> &SimulationParams { &self.params }
    pub fn currency(&self) -> Currency { self.currency }
    pub fn table(&self) -> &UnitTable { &self.table }

    pub fn bounds(&self, name: ParamName) -> ParamBounds {
        self.table.bounds(self.currency, name)
    }

    /// Clamp and store one parameter. Non-finite input is ignored and
    /// reported by returning false.
    pub fn set_param(&mut self, name: ParamName, value: f64) -> bool {
        if !value.is_finite() {
            log::warn!("ignoring non-finite value for {}: {value}", name.as_str());
            return false;
        }
        let clamped = self.bounds(name).clamp(value);
        self.params.put(name, clamped);
        true
    }

    /// Replace every parameter at once, e.g. when a saved session is
    /// loaded. Stored values are kept as-is apart from the structural
    /// invariants; UI bounds are not re-applied.
    pub fn replace(&mut self, params: SimulationParams) {
        self.params = params.sanitized();
    }

    /// Rescale the money fields into `target`, rounding to whole units and
    /// capping at the target currency's maximum.
    ///
    /// Converting A -> B -> A is lossy: rounding and the cap both discard
    /// information (e.g. a USD CPM of 25 becomes 100 000 COP, is capped at
    /// 50 000, and comes back as 13 USD).
    ///
    /// Returns false when `target` is already active.
    pub fn convert_currency(&mut self, target: Currency) -> bool {
        if target == self.currency {
            return false;
        }
        let factor = match target {
            Currency::Cop => self.exchange_rate,
            Currency::Usd => 1.0 / self.exchange_rate,
        };
        let ceiling = *self.table.money(target);
        let rescale = |v: f64, max: f64| (v * factor).round().min(max);

        self.params.budget = rescale(self.params.budget, ceiling.budget.max);
        self.params.cpm    = rescale(self.params.cpm, ceiling.cpm.max);
        self.params.aov    = rescale(self.params.aov, ceiling.aov.max);
        log::debug!(
            "currency {} -> {target}: budget={} cpm={} aov={}",
            self.currency, self.params.budget, self.params.cpm, self.params.aov
        );
        self.currency = target;
        true
    }
}
