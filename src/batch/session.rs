use crate::model::{Budget, FetchOutcome, LookbackWindow, TickerSymbol};

use super::delivery::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

/// Result of offering an outcome to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Counted; `completed` is true when this outcome was the last one.
    Accepted { completed: bool },
    /// The dispatch index was already applied.
    Duplicate,
    /// The dispatch index does not belong to this batch.
    OutOfRange,
    /// The session is not running.
    Inactive,
    /// The outcome belongs to an earlier, superseded session.
    Superseded,
}

/// State of one load: the budget/window snapshot, counters and collected outcomes.
#[derive(Debug, Clone)]
pub struct BatchSession {
    id: SessionId,
    symbols: Vec<TickerSymbol>,
    budget: Budget,
    window: LookbackWindow,
    total: usize,
    processed: usize,
    applied: Vec<bool>,
    outcomes: Vec<(usize, FetchOutcome)>,
    state: BatchState,
}

impl BatchSession {
    /// Snapshot the inputs. An empty symbol list stays `Idle` with 0/0 progress.
    pub fn start(
        id: SessionId,
        symbols: Vec<TickerSymbol>,
        budget: Budget,
        window: LookbackWindow,
    ) -> Self {
        let total = symbols.len();
        let state = if total == 0 {
            BatchState::Idle
        } else {
            BatchState::Running
        };

        Self {
            id,
            symbols,
            budget,
            window,
            total,
            processed: 0,
            applied: vec![false; total],
            outcomes: Vec::with_capacity(total),
            state,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn symbols(&self) -> &[TickerSymbol] {
        &self.symbols
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn window(&self) -> LookbackWindow {
        self.window
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == BatchState::Running
    }

    pub fn progress(&self) -> Progress {
        Progress {
            processed: self.processed,
            total: self.total,
        }
    }

    /// Applied outcomes in the order they completed.
    pub fn outcomes(&self) -> &[(usize, FetchOutcome)] {
        &self.outcomes
    }

    /// Dispatch indices, with their symbols, that have not been applied yet.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &TickerSymbol)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.applied[*index])
    }

    /// Count an outcome once. Must only be called from the consuming context.
    pub fn apply(&mut self, index: usize, outcome: FetchOutcome) -> Applied {
        if self.state != BatchState::Running {
            return Applied::Inactive;
        }
        let Some(seen) = self.applied.get_mut(index) else {
            return Applied::OutOfRange;
        };
        if *seen {
            return Applied::Duplicate;
        }

        *seen = true;
        self.outcomes.push((index, outcome));
        self.processed += 1;

        let completed = self.processed == self.total;
        if completed {
            self.state = BatchState::Completed;
        }
        Applied::Accepted { completed }
    }
}
