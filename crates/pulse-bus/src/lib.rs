//! Pulse Bus — in-process, synchronous event publication.
//!
//! `EventBus::publish` fans an event out to matching subscribers in
//! registration order, writes exactly one audit record per event id, and
//! then tells `EventLogged` listeners the record is durable. Subscriber
//! delivery is best-effort; the audit write is not.

pub mod bus;
pub mod config;
pub mod pattern;
pub mod pending;
pub mod registry;
pub mod report;

pub use bus::EventBus;
pub use config::BusConfig;
pub use pattern::EventPattern;
pub use pending::PendingEvents;
pub use registry::{SubscriberRegistry, SubscriberRegistryBuilder};
pub use report::{FailureKind, PublishReport, SubscriberFailure};
