//! Pulse Core — shared domain event abstractions.
//!
//! This crate defines the event base, identifiers, and the traits at the
//! seams of the event subsystem (audit sink, subscribers, audit-completion
//! listeners). It contains no infrastructure code.

pub mod audit;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod logged;
pub mod subscriber;
