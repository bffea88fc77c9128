use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Months, NaiveDate};

use crate::error::ProviderError;
use crate::model::{DividendEvent, TickerSymbol};

use super::provider::{MarketDataProvider, ProviderResult, QuoteSnapshot};

/// Canned behaviour for one symbol.
#[derive(Debug, Clone, Default)]
pub struct Script {
    price: Option<f64>,
    quote_fails: bool,
    dividends: Vec<DividendEvent>,
    dividends_fail: bool,
    delay: Duration,
    panics: bool,
}

impl Script {
    pub fn priced(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn unpriced() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            quote_fails: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::default()
        }
    }

    pub fn monthly_dividends(mut self, first: NaiveDate, count: u32, amount: f64) -> Self {
        self.dividends.extend((0..count).filter_map(|i| {
            first
                .checked_add_months(Months::new(i))
                .map(|date| DividendEvent { date, amount })
        }));
        self
    }

    pub fn failing_dividends(mut self) -> Self {
        self.dividends_fail = true;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// In-process provider that replays scripts and tracks how many quote calls overlap.
#[derive(Default)]
pub struct MockProvider {
    scripts: HashMap<String, Script>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, script: Script) -> Self {
        self.scripts.insert(symbol.to_uppercase(), script);
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn quote_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn script(&self, symbol: &TickerSymbol) -> ProviderResult<&Script> {
        self.scripts
            .get(symbol.as_str())
            .ok_or_else(|| ProviderError::new(format!("unknown symbol {symbol}")))
    }
}

impl MarketDataProvider for MockProvider {
    async fn get_quote(&self, symbol: &TickerSymbol) -> ProviderResult<QuoteSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script(symbol)?.clone();

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if script.panics {
            panic!("scripted provider panic for {symbol}");
        }
        if script.quote_fails {
            return Err(ProviderError::new("scripted quote failure"));
        }
        Ok(QuoteSnapshot {
            current_price: script.price,
            market_price: None,
            previous_close: None,
        })
    }

    async fn get_dividend_history(&self, symbol: &TickerSymbol) -> ProviderResult<Vec<DividendEvent>> {
        let script = self.script(symbol)?;
        if script.dividends_fail {
            return Err(ProviderError::new("scripted dividend failure"));
        }
        Ok(script.dividends.clone())
    }
}
