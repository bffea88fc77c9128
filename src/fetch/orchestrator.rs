use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;

use futures::{FutureExt, Stream};
use log::{debug, warn};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::model::{Budget, FailureReason, FetchOutcome, LookbackWindow, TickerSymbol};

use super::provider::MarketDataProvider;
use super::worker::fetch_ticker;
use super::{ensure_concurrency_limit, DEFAULT_FETCH_TIMEOUT, FETCH_CONCURRENCY_LIMIT};

/// Cancellation flag shared by every submission of one `dispatch` call.
#[derive(Debug, Clone, Default)]
pub struct DispatchHandle {
    cancelled: Arc<AtomicBool>,
}

impl DispatchHandle {
    /// Submissions still waiting for a pool slot are skipped once admitted; running ones finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Bounded pool that fans ticker fetches out to a provider.
pub struct Orchestrator<P> {
    provider: Arc<P>,
    gate: Arc<Semaphore>,
    concurrency_limit: usize,
    timeout: Duration,
    tasks: Mutex<JoinSet<()>>,
}

impl<P: MarketDataProvider> Orchestrator<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_limits(provider, FETCH_CONCURRENCY_LIMIT, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_limits(provider: Arc<P>, concurrency_limit: usize, timeout: Duration) -> Self {
        let concurrency_limit = ensure_concurrency_limit(concurrency_limit);
        Self {
            provider,
            gate: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
            timeout,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Submit every symbol and hand each outcome to `deliver` as soon as it is ready.
    ///
    /// `deliver` runs on worker tasks and is called at most once per symbol, in completion
    /// order. It is skipped for submissions cancelled through the returned handle and for
    /// fetches aborted by `shutdown`. A submission that finds the pool closed is delivered
    /// as a `Timeout` failure.
    pub fn dispatch<F>(
        &self,
        symbols: &[TickerSymbol],
        window: LookbackWindow,
        budget: Budget,
        deliver: F,
    ) -> DispatchHandle
    where
        F: Fn(usize, FetchOutcome) + Clone + Send + Sync + 'static,
    {
        let handle = DispatchHandle::default();
        let mut tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while tasks.try_join_next().is_some() {}

        for (index, symbol) in symbols.iter().cloned().enumerate() {
            let provider = Arc::clone(&self.provider);
            let gate = Arc::clone(&self.gate);
            let deliver = deliver.clone();
            let handle = handle.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                // Queued submissions wait here; the permit bounds in-flight fetches.
                let Ok(_permit) = gate.acquire_owned().await else {
                    debug!("fetch pool closed before {} was admitted", symbol);
                    deliver(index, FetchOutcome::failure(symbol, FailureReason::Timeout));
                    return;
                };
                if handle.is_cancelled() {
                    debug!("skipping {}: its batch was cancelled", symbol);
                    return;
                }

                let outcome = run_guarded(provider.as_ref(), &symbol, window, budget, timeout).await;
                deliver(index, outcome);
            });
        }

        debug!(
            "dispatched {} tickers (limit {})",
            symbols.len(),
            self.concurrency_limit
        );
        handle
    }

    /// Submit a batch and receive its outcomes as a stream that ends after `symbols.len()` items.
    pub fn run(&self, symbols: &[TickerSymbol], window: LookbackWindow, budget: Budget) -> OutcomeStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.dispatch(symbols, window, budget, move |index, outcome| {
            let _ = tx.send((index, outcome));
        });
        OutcomeStream { rx }
    }

    /// Stop admitting queued fetches, give in-flight ones `grace` to finish, then abort the rest.
    pub async fn shutdown(&self, grace: Duration) {
        self.gate.close();
        let mut tasks = {
            let mut guard = match self.tasks.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *guard)
        };

        let drained = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                "{} fetches still running after {:?}; abandoning them",
                tasks.len(),
                grace
            );
            tasks.abort_all();
        }
    }
}

/// Apply the per-fetch time bound and contain panics so every admitted fetch yields an outcome.
async fn run_guarded<P>(
    provider: &P,
    symbol: &TickerSymbol,
    window: LookbackWindow,
    budget: Budget,
    timeout: Duration,
) -> FetchOutcome
where
    P: MarketDataProvider + ?Sized,
{
    let guarded = AssertUnwindSafe(fetch_ticker(provider, symbol, window, budget)).catch_unwind();

    match tokio::time::timeout(timeout, guarded).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_panic)) => {
            warn!("fetch for {} panicked", symbol);
            FetchOutcome::failure(symbol.clone(), FailureReason::ProviderError)
        }
        Err(_) => {
            warn!("fetch for {} exceeded {:?}", symbol, timeout);
            FetchOutcome::failure(symbol.clone(), FailureReason::Timeout)
        }
    }
}

/// Outcomes of one `Orchestrator::run`, in completion order, tagged with their dispatch index.
pub struct OutcomeStream {
    rx: mpsc::UnboundedReceiver<(usize, FetchOutcome)>,
}

impl OutcomeStream {
    pub async fn next_outcome(&mut self) -> Option<(usize, FetchOutcome)> {
        self.rx.recv().await
    }
}

impl Stream for OutcomeStream {
    type Item = (usize, FetchOutcome);

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
