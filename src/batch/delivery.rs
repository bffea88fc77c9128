use std::fmt;

use log::debug;
use tokio::sync::mpsc;

use crate::model::FetchOutcome;

/// Identifies the batch an outcome was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One outcome in transit from a worker to the consumer.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub session: SessionId,
    pub index: usize,
    pub outcome: FetchOutcome,
}

/// Multi-producer, single-consumer hand-off between the fetch pool and the consumer.
pub fn channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResultSender { tx }, ResultReceiver { rx })
}

#[derive(Clone)]
pub struct ResultSender {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ResultSender {
    /// Bind the sender to a session so every envelope carries its origin.
    pub fn for_session(&self, session: SessionId) -> SessionSender {
        SessionSender {
            session,
            tx: self.tx.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SessionSender {
    session: SessionId,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl SessionSender {
    pub fn deliver(&self, index: usize, outcome: FetchOutcome) {
        let envelope = Envelope {
            session: self.session,
            index,
            outcome,
        };
        if self.tx.send(envelope).is_err() {
            debug!(
                "consumer gone; dropping outcome {} of session {}",
                index, self.session
            );
        }
    }
}

/// The only place outcomes come out of the channel.
pub struct ResultReceiver {
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl ResultReceiver {
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}
