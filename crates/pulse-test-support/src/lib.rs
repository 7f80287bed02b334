//! Shared test mocks and utilities for the Pulse event core.

mod audit;
mod clock;
mod event;
mod subscriber;

pub use audit::{FailingAuditSink, RecordingAuditSink};
pub use clock::{FixedClock, fixed_now};
pub use event::TestEvent;
pub use subscriber::{
    CallJournal, FailingLoggedListener, FailingSubscriber, PanickingSubscriber,
    RecordingLoggedListener, RecordingSubscriber, StallingSubscriber,
};
