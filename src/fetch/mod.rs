use std::time::Duration;

pub mod orchestrator;
pub mod provider;
pub mod worker;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{DispatchHandle, Orchestrator, OutcomeStream};
pub use provider::{MarketDataProvider, ProviderResult, QuoteSnapshot};
pub use worker::fetch_ticker;
pub use yahoo::YahooProvider;

/// Default concurrency guard applied when fetching tickers.
pub const FETCH_CONCURRENCY_LIMIT: usize = crate::config::DEFAULT_CONCURRENCY;

/// Upper bound on a single ticker fetch, queue time excluded.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
