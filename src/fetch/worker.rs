use log::warn;

use crate::metrics;
use crate::model::{
    Budget, DividendEvent, FailureReason, FetchOutcome, LookbackWindow, TickerReport, TickerSymbol,
};

use super::provider::MarketDataProvider;

/// Fetch one ticker and turn whatever happens into a `FetchOutcome`.
pub async fn fetch_ticker<P>(
    provider: &P,
    symbol: &TickerSymbol,
    window: LookbackWindow,
    budget: Budget,
) -> FetchOutcome
where
    P: MarketDataProvider + ?Sized,
{
    let symbol = TickerSymbol::from_canonical(symbol.as_str());

    let quote = match provider.get_quote(&symbol).await {
        Ok(quote) => quote,
        Err(err) => {
            warn!("quote lookup for {} failed: {}", symbol, err);
            return FetchOutcome::failure(symbol, FailureReason::ProviderError);
        }
    };

    let Some(price) = quote.usable_price() else {
        warn!("no usable price for {}", symbol);
        return FetchOutcome::failure(symbol, FailureReason::NoPrice);
    };

    let history = match provider.get_dividend_history(&symbol).await {
        Ok(history) => history,
        Err(err) => {
            warn!("dividend history for {} failed: {}", symbol, err);
            return FetchOutcome::failure(symbol, FailureReason::ProviderError);
        }
    };

    let in_window = dividends_in_window(history, &window);
    let metrics = metrics::compute(price, &in_window, budget);

    FetchOutcome::Success(TickerReport {
        symbol,
        price,
        trailing_dividend_total: metrics.trailing_dividend_total,
        shares_affordable: metrics.shares_affordable,
        projected_income: metrics.projected_income,
        category: metrics.category,
    })
}

fn dividends_in_window(history: Vec<DividendEvent>, window: &LookbackWindow) -> Vec<DividendEvent> {
    let mut events: Vec<DividendEvent> = history
        .into_iter()
        .filter(|event| window.contains(event.date))
        .collect();
    events.sort_by_key(|event| event.date);
    events
}
