use std::future::Future;

use crate::error::ProviderError;
use crate::model::{DividendEvent, TickerSymbol};

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Candidate price fields returned by a quote lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuoteSnapshot {
    pub current_price: Option<f64>,
    pub market_price: Option<f64>,
    pub previous_close: Option<f64>,
}

impl QuoteSnapshot {
    /// First positive, finite candidate in preference order.
    pub fn usable_price(&self) -> Option<f64> {
        [self.current_price, self.market_price, self.previous_close]
            .into_iter()
            .flatten()
            .find(|price| price.is_finite() && *price > 0.0)
    }
}

/// External market-data service consulted once per ticker and batch.
pub trait MarketDataProvider: Send + Sync + 'static {
    fn get_quote(
        &self,
        symbol: &TickerSymbol,
    ) -> impl Future<Output = ProviderResult<QuoteSnapshot>> + Send;

    /// Full dividend history; ordering is not guaranteed.
    fn get_dividend_history(
        &self,
        symbol: &TickerSymbol,
    ) -> impl Future<Output = ProviderResult<Vec<DividendEvent>>> + Send;
}
