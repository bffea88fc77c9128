use std::collections::HashMap;
use std::time::Duration;

use chrono::DateTime;
use log::debug;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::ProviderSettings;
use crate::error::{Context, ProviderError, Result};
use crate::model::{DividendEvent, TickerSymbol};

use super::provider::{MarketDataProvider, ProviderResult, QuoteSnapshot};

/// Market-data provider backed by the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooProvider {
    client: Client,
    settings: ProviderSettings,
}

impl YahooProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("Failed to construct market data HTTP client")?;
        Ok(Self { client, settings })
    }

    async fn chart(&self, symbol: &TickerSymbol, query: &[(&str, &str)]) -> ProviderResult<String> {
        let url = format!(
            "{}/{}",
            self.settings.chart_endpoint.trim_end_matches('/'),
            symbol.as_str()
        );

        let response = self
            .client
            .get(&url)
            .query(query)
            .header(USER_AGENT, self.settings.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::new(format!("unknown symbol {symbol}")));
        }
        if !status.is_success() {
            return Err(ProviderError::new(format!(
                "chart request for {symbol} failed with status {status}"
            )));
        }

        let body = response.text().await?;
        debug!("chart response for {} ({} bytes)", symbol, body.len());
        Ok(body)
    }
}

impl MarketDataProvider for YahooProvider {
    async fn get_quote(&self, symbol: &TickerSymbol) -> ProviderResult<QuoteSnapshot> {
        let body = self
            .chart(symbol, &[("range", "1d"), ("interval", "1d")])
            .await?;
        parse_quote(&body)
    }

    async fn get_dividend_history(&self, symbol: &TickerSymbol) -> ProviderResult<Vec<DividendEvent>> {
        let body = self
            .chart(
                symbol,
                &[
                    ("range", self.settings.range.as_str()),
                    ("interval", "1mo"),
                    ("events", "div"),
                ],
            )
            .await?;
        parse_dividends(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    current_price: Option<f64>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, RawDividend>,
}

#[derive(Debug, Deserialize)]
struct RawDividend {
    amount: f64,
    date: i64,
}

fn first_result(body: &str) -> ProviderResult<ChartResult> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.chart.error {
        return Err(ProviderError::new(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::new("chart response carried no result"))
}

pub(crate) fn parse_quote(body: &str) -> ProviderResult<QuoteSnapshot> {
    let meta = first_result(body)?.meta;
    Ok(QuoteSnapshot {
        current_price: meta.current_price,
        market_price: meta.regular_market_price,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
    })
}

pub(crate) fn parse_dividends(body: &str) -> ProviderResult<Vec<DividendEvent>> {
    let Some(events) = first_result(body)?.events else {
        return Ok(Vec::new());
    };

    let mut dividends = events
        .dividends
        .into_values()
        .filter_map(|raw| {
            let date = DateTime::from_timestamp(raw.date, 0)?.date_naive();
            Some(DividendEvent {
                date,
                amount: raw.amount,
            })
        })
        .collect::<Vec<_>>();

    dividends.sort_by_key(|event| event.date);
    Ok(dividends)
}
