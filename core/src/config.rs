use crate::{
    activity_log::{LogPolicy, DEFAULT_LOG_CAPACITY},
    params::{Currency, ParamName, SimulationParams, UnitTable},
};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `advisory.webhook_url`.
pub const ADVISORY_URL_ENV: &str = "ADSIM_ADVISORY_URL";

pub const DEFAULT_EXCHANGE_RATE: f64 = 4_000.0;

pub const ADVISORY_FAILURE_MESSAGE: &str =
    "Sorry, the campaign analysis could not be generated right now. Please try again later.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Webhook that turns a simulation into advice. When unset the
    /// offline coach is used.
    #[serde(default)]
    pub webhook_url:     Option<String>,
    pub timeout_secs:    u64,
    /// Shown to the user verbatim when the advisory call fails.
    pub failure_message: String,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            webhook_url:     None,
            timeout_secs:    30,
            failure_message: ADVISORY_FAILURE_MESSAGE.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub default_params:   SimulationParams,
    pub default_currency: Currency,
    /// COP per 1 USD.
    pub exchange_rate:    f64,
    pub units:            UnitTable,
    /// Wall-clock gap between ticks. A tuning knob, not a contract.
    pub tick_interval_ms: u64,
    pub log_capacity:     usize,
    pub log_policy:       LogPolicy,
    #[serde(default)]
    pub advisory:         AdvisoryConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            default_params:   SimulationParams::default(),
            default_currency: Currency::Usd,
            exchange_rate:    DEFAULT_EXCHANGE_RATE,
            units:            UnitTable::default(),
            tick_interval_ms: 50,
            log_capacity:     DEFAULT_LOG_CAPACITY,
            log_policy:       LogPolicy::default(),
            advisory:         AdvisoryConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load from the data/ directory, then apply environment overrides.
    /// In tests, use SimConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/simulator.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ADVISORY_URL_ENV) {
            if !url.trim().is_empty() {
                self.advisory.webhook_url = Some(url.trim().to_string());
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.exchange_rate.is_finite() && self.exchange_rate > 0.0) {
            anyhow::bail!("exchange_rate must be positive, got {}", self.exchange_rate);
        }
        if self.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be at least 1");
        }
        if self.log_capacity == 0 {
            anyhow::bail!("log_capacity must be at least 1");
        }
        for currency in [Currency::Usd, Currency::Cop] {
            for name in ParamName::ALL {
                let b = self.units.bounds(currency, name);
                if !(b.min.is_finite() && b.max.is_finite()) {
                    anyhow::bail!("{currency} {} bounds must be finite", name.as_str());
                }
                if b.min > b.max {
                    anyhow::bail!(
                        "{currency} {} bounds inverted: {} > {}",
                        name.as_str(), b.min, b.max
                    );
                }
            }
        }
        Ok(())
    }
}
