use crate::model::FetchOutcome;

use super::session::{BatchSession, Progress};

/// Lifecycle hooks invoked from the consuming context only.
pub trait BatchEvents {
    fn on_batch_started(&mut self, total: usize);

    fn on_outcome(&mut self, index: usize, outcome: &FetchOutcome, progress: Progress);

    fn on_batch_completed(&mut self, session: &BatchSession);

    /// A load was requested with nothing to fetch.
    fn on_no_tickers(&mut self) {}
}

/// Hooks that ignore every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl BatchEvents for NoopEvents {
    fn on_batch_started(&mut self, _total: usize) {}

    fn on_outcome(&mut self, _index: usize, _outcome: &FetchOutcome, _progress: Progress) {}

    fn on_batch_completed(&mut self, _session: &BatchSession) {}
}
