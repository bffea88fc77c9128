use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub mod loader;
pub mod validator;

pub use loader::load_config;
pub use validator::validate_config;

/// Default number of concurrent ticker fetches.
pub const DEFAULT_CONCURRENCY: usize = 6;
pub const DEFAULT_MARKET_SUFFIX: &str = ".SA";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Market-region suffix appended to symbols that lack one.
    pub market_suffix: String,
    pub concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub shutdown_grace_ms: u64,
    pub default_budget: f64,
    pub lookback_months: u32,
    pub store_path: PathBuf,
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub chart_endpoint: String,
    pub user_agent: String,
    /// History range requested from the chart endpoint, e.g. `2y`.
    pub range: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            chart_endpoint: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            range: "2y".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            market_suffix: DEFAULT_MARKET_SUFFIX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout_secs: 15,
            shutdown_grace_ms: 2_000,
            default_budget: 1_000.0,
            lookback_months: 12,
            store_path: PathBuf::from("database/tickers.csv"),
            provider: ProviderSettings::default(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
