pub mod delivery;
pub mod events;
pub mod session;
pub mod tracker;

pub use delivery::{channel, Envelope, ResultReceiver, ResultSender, SessionId, SessionSender};
pub use events::{BatchEvents, NoopEvents};
pub use session::{Applied, BatchSession, BatchState, Progress};
pub use tracker::BatchTracker;
