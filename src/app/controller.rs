use std::io::{self, Write};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use log::info;

use crate::app::report::{render_table, sort_outcomes, ConsoleReporter, SortSpec};
use crate::batch::{BatchEvents, BatchTracker};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::{MarketDataProvider, Orchestrator, YahooProvider};
use crate::model::{Budget, FetchOutcome, LookbackWindow, TickerSymbol};
use crate::records::{self, CsvTickerStore, TickerStore};

/// Per-invocation overrides for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub budget: Option<f64>,
    pub since: Option<NaiveDate>,
    pub workers: Option<usize>,
    pub sort: Option<SortSpec>,
}

/// Connects the ticker store, the fetch pipeline and console output.
pub struct AppController {
    config: Config,
    store: CsvTickerStore,
}

impl AppController {
    pub fn new(config: Config) -> Result<Self> {
        let mut store =
            CsvTickerStore::new(config.store_path.clone(), config.market_suffix.clone());
        store.init()?;
        Ok(Self { config, store })
    }

    pub fn list(&self) -> Result<Vec<TickerSymbol>> {
        Ok(self.store.list()?.into_iter().collect())
    }

    pub fn add(&mut self, raw: &str) -> Result<TickerSymbol> {
        let symbol = records::register_ticker(&mut self.store, raw, &self.config.market_suffix)?;
        info!("registered {}", symbol);
        Ok(symbol)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<TickerSymbol> {
        let symbol =
            records::rename_ticker(&mut self.store, old, new, &self.config.market_suffix)?;
        info!("renamed {} to {}", old, symbol);
        Ok(symbol)
    }

    pub fn remove(&mut self, raw: &str) -> Result<TickerSymbol> {
        let symbol = records::remove_ticker(&mut self.store, raw, &self.config.market_suffix)?;
        info!("removed {}", symbol);
        Ok(symbol)
    }

    /// Fetch every registered ticker and print the resulting table to stdout.
    pub async fn scan(&self, options: &ScanOptions) -> Result<()> {
        let symbols = self.list()?;
        let provider = Arc::new(YahooProvider::new(self.config.provider.clone())?);
        let reporter = ConsoleReporter::new(io::stderr(), self.config.market_suffix.clone());

        let outcomes = run_scan(&self.config, provider, symbols, options, reporter).await?;
        if outcomes.is_empty() {
            return Ok(());
        }

        let table = render_table(&outcomes, &self.config.market_suffix);
        let mut stdout = io::stdout().lock();
        stdout.write_all(table.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Run one batch to completion and return its outcomes, sorted if requested.
pub async fn run_scan<P, E>(
    config: &Config,
    provider: Arc<P>,
    symbols: Vec<TickerSymbol>,
    options: &ScanOptions,
    events: E,
) -> Result<Vec<(usize, FetchOutcome)>>
where
    P: MarketDataProvider,
    E: BatchEvents,
{
    let budget = resolve_budget(config, options)?;
    let window = resolve_window(config, options, Local::now().date_naive())?;
    let workers = options.workers.unwrap_or(config.concurrency);

    let orchestrator = Orchestrator::with_limits(provider, workers, config.fetch_timeout());
    let mut tracker = BatchTracker::new(orchestrator, events);

    info!(
        "scanning {} tickers with budget {:.2} since {}",
        symbols.len(),
        budget.amount(),
        window.start
    );
    tracker.start(symbols, budget, window);
    let mut outcomes = tracker
        .wait_for_completion()
        .await
        .map(|session| session.outcomes().to_vec())
        .unwrap_or_default();
    tracker.shutdown(config.shutdown_grace()).await;

    if let Some(order) = options.sort {
        sort_outcomes(&mut outcomes, order);
    }
    Ok(outcomes)
}

fn resolve_budget(config: &Config, options: &ScanOptions) -> Result<Budget> {
    let amount = options.budget.unwrap_or(config.default_budget);
    Budget::new(amount).ok_or_else(|| {
        AppError::message(format!("budget must be a non-negative amount, got {amount}"))
    })
}

fn resolve_window(
    config: &Config,
    options: &ScanOptions,
    today: NaiveDate,
) -> Result<LookbackWindow> {
    match options.since {
        Some(start) if start > today => Err(AppError::message(format!(
            "dividend window cannot start after today ({start} > {today})"
        ))),
        Some(start) => Ok(LookbackWindow::since(start, today)),
        None => Ok(LookbackWindow::trailing(today, config.lookback_months)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::NoopEvents;
    use crate::fetch::testing::{MockProvider, Script};
    use crate::model::FailureReason;

    #[test]
    fn explicit_since_overrides_trailing_window() {
        let config = Config::builtin();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let since = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        let options = ScanOptions {
            since: Some(since),
            ..ScanOptions::default()
        };
        assert_eq!(resolve_window(&config, &options, today).expect("window").start, since);
        assert_eq!(
            resolve_window(&config, &ScanOptions::default(), today)
                .expect("window")
                .start,
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
        );
    }

    #[test]
    fn since_after_today_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let options = ScanOptions {
            since: Some(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()),
            ..ScanOptions::default()
        };
        assert!(resolve_window(&Config::builtin(), &options, today).is_err());

        let same_day = ScanOptions {
            since: Some(today),
            ..ScanOptions::default()
        };
        let window = resolve_window(&Config::builtin(), &same_day, today).expect("window");
        assert_eq!((window.start, window.end), (today, today));
    }

    #[test]
    fn negative_budget_is_rejected() {
        let options = ScanOptions {
            budget: Some(-5.0),
            ..ScanOptions::default()
        };
        assert!(resolve_budget(&Config::builtin(), &options).is_err());
    }

    #[tokio::test]
    async fn run_scan_returns_one_outcome_per_symbol() {
        let provider = Arc::new(
            MockProvider::new()
                .with("AAA.SA", Script::priced(100.0))
                .with("BBB.SA", Script::unpriced()),
        );
        let symbols = vec![
            TickerSymbol::from_canonical("AAA.SA"),
            TickerSymbol::from_canonical("BBB.SA"),
        ];

        let outcomes = run_scan(
            &Config::builtin(),
            provider,
            symbols,
            &ScanOptions::default(),
            NoopEvents,
        )
        .await
        .expect("scan runs");

        assert_eq!(outcomes.len(), 2);
        let failed = outcomes
            .iter()
            .find(|(index, _)| *index == 1)
            .map(|(_, outcome)| outcome.clone())
            .expect("BBB outcome");
        assert_eq!(
            failed,
            FetchOutcome::failure(TickerSymbol::from_canonical("BBB.SA"), FailureReason::NoPrice)
        );
    }

    #[test]
    fn store_commands_normalise_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::builtin();
        config.store_path = dir.path().join("tickers.csv");

        let mut controller = AppController::new(config).expect("controller");
        assert_eq!(controller.add("petr4").expect("add").as_str(), "PETR4.SA");
        assert!(controller.add("PETR4.SA").is_err());
        controller.rename("petr4", "petr3").expect("rename");
        assert_eq!(
            controller.list().expect("list"),
            vec![TickerSymbol::from_canonical("PETR3.SA")]
        );
        controller.remove("PETR3").expect("remove");
        assert!(controller.list().expect("list").is_empty());
    }
}
