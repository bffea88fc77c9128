use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use pointer::batch::{Applied, BatchState, BatchTracker, NoopEvents, Progress};
use pointer::fetch::{MarketDataProvider, Orchestrator, ProviderResult, QuoteSnapshot};
use pointer::model::{
    Budget, Category, DividendEvent, FailureReason, FetchOutcome, LookbackWindow, TickerSymbol,
};
use pointer::records::{register_ticker, MemoryTickerStore, TickerStore};
use pointer::{ProviderError, StoreError};

#[derive(Clone)]
struct Listing {
    price: Option<f64>,
    dividends: Vec<DividendEvent>,
    delay: Duration,
}

#[derive(Default)]
struct StubMarket {
    listings: HashMap<String, Listing>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl StubMarket {
    fn list(mut self, symbol: &str, price: Option<f64>, dividends: Vec<DividendEvent>) -> Self {
        self.listings.insert(
            symbol.to_string(),
            Listing {
                price,
                dividends,
                delay: Duration::ZERO,
            },
        );
        self
    }

    fn slow(mut self, symbol: &str, price: f64, delay: Duration) -> Self {
        self.listings.insert(
            symbol.to_string(),
            Listing {
                price: Some(price),
                dividends: Vec::new(),
                delay,
            },
        );
        self
    }

    fn listing(&self, symbol: &TickerSymbol) -> ProviderResult<Listing> {
        self.listings
            .get(symbol.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::new(format!("no listing for {symbol}")))
    }
}

impl MarketDataProvider for StubMarket {
    async fn get_quote(&self, symbol: &TickerSymbol) -> ProviderResult<QuoteSnapshot> {
        let listing = self.listing(symbol)?;
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(listing.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        Ok(QuoteSnapshot {
            current_price: None,
            market_price: listing.price,
            previous_close: None,
        })
    }

    async fn get_dividend_history(&self, symbol: &TickerSymbol) -> ProviderResult<Vec<DividendEvent>> {
        Ok(self.listing(symbol)?.dividends)
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn trailing_year() -> LookbackWindow {
    LookbackWindow::trailing(today(), 12)
}

fn twelve_payments_of(amount: f64) -> Vec<DividendEvent> {
    (1..=12)
        .map(|day| DividendEvent {
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            amount,
        })
        .collect()
}

fn sym(raw: &str) -> TickerSymbol {
    TickerSymbol::from_canonical(raw)
}

fn tracker(market: StubMarket, limit: usize) -> BatchTracker<StubMarket, NoopEvents> {
    let orchestrator = Orchestrator::with_limits(Arc::new(market), limit, Duration::from_secs(5));
    BatchTracker::new(orchestrator, NoopEvents)
}

#[tokio::test]
async fn mixed_batch_completes_with_success_and_failure() {
    let market = StubMarket::default()
        .list("AAA", Some(100.0), twelve_payments_of(10.0))
        .list("BBB", Some(0.0), Vec::new());
    let mut tracker = tracker(market, 6);

    tracker.start(
        vec![sym("AAA"), sym("BBB")],
        Budget::new(1000.0).unwrap(),
        trailing_year(),
    );
    let session = tracker.wait_for_completion().await.expect("session");

    assert_eq!(session.state(), BatchState::Completed);
    assert_eq!(session.progress(), Progress { processed: 2, total: 2 });

    let by_index: HashMap<usize, &FetchOutcome> =
        session.outcomes().iter().map(|(i, o)| (*i, o)).collect();

    let aaa = by_index[&0].report().expect("AAA succeeds");
    assert_eq!(aaa.shares_affordable, 10);
    assert!((aaa.trailing_dividend_total - 120.0).abs() < 1e-9);
    assert!((aaa.projected_income - 1200.0).abs() < 1e-9);
    assert_eq!(aaa.category, Category::High);

    assert!(matches!(
        by_index[&1],
        FetchOutcome::Failure {
            reason: FailureReason::NoPrice | FailureReason::ProviderError,
            ..
        }
    ));
}

#[tokio::test]
async fn zero_budget_buys_nothing() {
    let market = StubMarket::default()
        .list("CHEAP", Some(0.5), twelve_payments_of(0.1))
        .list("PRICY", Some(900.0), twelve_payments_of(3.0));
    let mut tracker = tracker(market, 2);

    tracker.start(vec![sym("CHEAP"), sym("PRICY")], Budget::zero(), trailing_year());
    let session = tracker.wait_for_completion().await.expect("session");

    for (_, outcome) in session.outcomes() {
        let report = outcome.report().expect("success");
        assert_eq!(report.shares_affordable, 0);
        assert_eq!(report.projected_income, 0.0);
    }
}

#[tokio::test]
async fn unknown_symbols_fail_without_aborting_the_batch() {
    let market = StubMarket::default().list("KNOWN", Some(10.0), Vec::new());
    let mut tracker = tracker(market, 3);

    tracker.start(
        vec![sym("GHOST1"), sym("KNOWN"), sym("GHOST2")],
        Budget::new(50.0).unwrap(),
        trailing_year(),
    );
    let session = tracker.wait_for_completion().await.expect("session");

    assert_eq!(session.progress().processed, 3);
    let successes = session
        .outcomes()
        .iter()
        .filter(|(_, o)| o.is_success())
        .count();
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn pool_limit_holds_for_large_batches() {
    let mut market = StubMarket::default();
    let names: Vec<String> = (0..20).map(|i| format!("S{i:02}")).collect();
    for name in &names {
        market = market.slow(name, 10.0, Duration::from_millis(15));
    }
    let market = Arc::new(market);
    let orchestrator = Orchestrator::with_limits(Arc::clone(&market), 4, Duration::from_secs(5));
    let mut tracker = BatchTracker::new(orchestrator, NoopEvents);

    tracker.start(
        names.iter().map(|name| sym(name)).collect(),
        Budget::new(100.0).unwrap(),
        trailing_year(),
    );
    let session = tracker.wait_for_completion().await.expect("session");

    assert_eq!(session.progress(), Progress { processed: 20, total: 20 });
    assert!(market.peak.load(Ordering::SeqCst) <= 4);
}

#[tokio::test]
async fn restarting_discards_the_previous_batch() {
    let market = StubMarket::default()
        .slow("OLD", 1.0, Duration::from_millis(100))
        .slow("NEW1", 1.0, Duration::from_millis(300))
        .slow("NEW2", 1.0, Duration::from_millis(300));
    let mut tracker = tracker(market, 6);

    tracker.start(vec![sym("OLD"), sym("OLD")], Budget::zero(), trailing_year());
    tokio::time::sleep(Duration::from_millis(10)).await;
    tracker.start(vec![sym("NEW1"), sym("NEW2")], Budget::zero(), trailing_year());

    let mut discarded = 0;
    while let Some(applied) = tracker.pump().await {
        if applied == Applied::Superseded {
            discarded += 1;
        }
    }

    let session = tracker.session().expect("session");
    assert_eq!(session.progress(), Progress { processed: 2, total: 2 });
    assert!(session
        .outcomes()
        .iter()
        .all(|(_, o)| o.symbol().as_str().starts_with("NEW")));
    assert_eq!(discarded, 2);
}

#[tokio::test]
async fn shutdown_never_leaves_a_batch_hanging() {
    let market = StubMarket::default()
        .list("QUICK", Some(20.0), twelve_payments_of(0.5))
        .slow("STUCK", 5.0, Duration::from_secs(30));
    let orchestrator =
        Orchestrator::with_limits(Arc::new(market), 2, Duration::from_secs(120));
    let mut tracker = BatchTracker::new(orchestrator, NoopEvents);

    tracker.start(
        vec![sym("QUICK"), sym("STUCK")],
        Budget::new(100.0).unwrap(),
        trailing_year(),
    );
    tokio::time::sleep(Duration::from_millis(20)).await;
    tracker.shutdown(Duration::from_millis(20)).await;

    let session = tokio::time::timeout(Duration::from_secs(2), tracker.wait_for_completion())
        .await
        .expect("no hang after shutdown")
        .expect("session");
    assert_eq!(session.state(), BatchState::Completed);
    assert_eq!(session.progress(), Progress { processed: 2, total: 2 });
    assert!(session.outcomes().iter().any(|(_, o)| matches!(
        o,
        FetchOutcome::Failure {
            reason: FailureReason::Timeout,
            ..
        }
    )));
}

#[test]
fn duplicate_registration_leaves_store_unchanged() {
    let mut store = MemoryTickerStore::default();
    store.init().unwrap();
    register_ticker(&mut store, "vale3", ".SA").unwrap();
    let before = store.list().unwrap();

    let err = register_ticker(&mut store, " Vale3.sa ", ".SA").unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(_)));
    assert_eq!(store.list().unwrap(), before);
}
