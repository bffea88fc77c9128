use std::time::Duration;

use log::{debug, info, warn};

use crate::fetch::{DispatchHandle, MarketDataProvider, Orchestrator};
use crate::model::{Budget, FailureReason, FetchOutcome, LookbackWindow, TickerSymbol};

use super::delivery::{self, Envelope, ResultReceiver, ResultSender, SessionId};
use super::events::BatchEvents;
use super::session::{Applied, BatchSession, BatchState};

/// Single consumer of batch outcomes.
///
/// Owns the current `BatchSession` and is the only code that mutates it. Workers
/// only ever see a session-bound sender, so outcomes of a superseded batch reach
/// the consumer tagged with their old id and are discarded here.
pub struct BatchTracker<P, E> {
    orchestrator: Orchestrator<P>,
    sender: ResultSender,
    receiver: ResultReceiver,
    session: Option<BatchSession>,
    dispatch: Option<DispatchHandle>,
    next_id: u64,
    events: E,
}

impl<P, E> BatchTracker<P, E>
where
    P: MarketDataProvider,
    E: BatchEvents,
{
    pub fn new(orchestrator: Orchestrator<P>, events: E) -> Self {
        let (sender, receiver) = delivery::channel();
        Self {
            orchestrator,
            sender,
            receiver,
            session: None,
            dispatch: None,
            next_id: 0,
            events,
        }
    }

    /// Begin a new batch, superseding any batch still running. Never waits on old fetches:
    /// those already running drain and are discarded, queued ones are skipped.
    pub fn start(
        &mut self,
        symbols: Vec<TickerSymbol>,
        budget: Budget,
        window: LookbackWindow,
    ) -> SessionId {
        self.next_id += 1;
        let id = SessionId(self.next_id);

        if let Some(previous) = self.session.as_ref().filter(|s| s.is_running()) {
            let progress = previous.progress();
            info!(
                "session {} superseded by {} at {}/{}",
                previous.id(),
                id,
                progress.processed,
                progress.total
            );
        }
        if let Some(previous) = self.dispatch.take() {
            previous.cancel();
        }

        let session = BatchSession::start(id, symbols, budget, window);
        if session.state() == BatchState::Idle {
            info!("session {} has no tickers to fetch", id);
            self.events.on_no_tickers();
        } else {
            info!(
                "session {} started: {} tickers, budget {:.2}, dividends {}..={}",
                id,
                session.progress().total,
                session.budget().amount(),
                session.window().start,
                session.window().end
            );
            self.events.on_batch_started(session.progress().total);
            let sender = self.sender.for_session(id);
            let handle = self.orchestrator.dispatch(
                session.symbols(),
                window,
                budget,
                move |index, outcome| sender.deliver(index, outcome),
            );
            self.dispatch = Some(handle);
        }

        self.session = Some(session);
        id
    }

    /// Wait for the next outcome and apply it. Returns `None` when no batch is running.
    pub async fn pump(&mut self) -> Option<Applied> {
        if !self.is_running() {
            return None;
        }
        let envelope = self.receiver.recv().await?;
        Some(self.apply(envelope))
    }

    /// Apply whatever outcomes are already queued without waiting; returns how many were counted.
    pub fn drain_ready(&mut self) -> usize {
        let mut counted = 0;
        while let Some(envelope) = self.receiver.try_recv() {
            if matches!(self.apply(envelope), Applied::Accepted { .. }) {
                counted += 1;
            }
        }
        counted
    }

    /// Drive the current batch until every outcome has been applied.
    pub async fn wait_for_completion(&mut self) -> Option<&BatchSession> {
        while self.is_running() {
            if self.pump().await.is_none() {
                break;
            }
        }
        self.session.as_ref()
    }

    pub fn session(&self) -> Option<&BatchSession> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(BatchSession::is_running)
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    /// Stop the pool, then settle the running batch so it always reaches its total.
    ///
    /// Outcomes already queued are applied; fetches that never reported are recorded
    /// as `Timeout` failures.
    pub async fn shutdown(&mut self, grace: Duration) {
        self.orchestrator.shutdown(grace).await;
        self.drain_ready();
        self.abandon_pending();
    }

    fn abandon_pending(&mut self) {
        let Some(session) = self.session.as_ref().filter(|s| s.is_running()) else {
            return;
        };
        let id = session.id();
        let pending: Vec<(usize, TickerSymbol)> = session
            .pending()
            .map(|(index, symbol)| (index, symbol.clone()))
            .collect();

        warn!(
            "session {} abandoned {} unfinished fetches at shutdown",
            id,
            pending.len()
        );
        for (index, symbol) in pending {
            self.apply(Envelope {
                session: id,
                index,
                outcome: FetchOutcome::failure(symbol, FailureReason::Timeout),
            });
        }
    }

    fn apply(&mut self, envelope: Envelope) -> Applied {
        let Self {
            session, events, ..
        } = self;

        let Some(session) = session.as_mut() else {
            return Applied::Superseded;
        };
        if envelope.session != session.id() {
            debug!(
                "discarding outcome {} for {} from superseded session {}",
                envelope.index,
                envelope.outcome.symbol(),
                envelope.session
            );
            return Applied::Superseded;
        }

        let applied = session.apply(envelope.index, envelope.outcome);
        if let Applied::Accepted { completed } = applied {
            if let Some((index, outcome)) = session.outcomes().last() {
                events.on_outcome(*index, outcome, session.progress());
            }
            if completed {
                info!("session {} completed", session.id());
                events.on_batch_completed(session);
            }
        } else {
            debug!("session {} ignored outcome: {:?}", session.id(), applied);
        }
        applied
    }
}
