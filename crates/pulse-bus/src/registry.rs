//! Subscriber registry.
//!
//! The registry is assembled once at startup through
//! [`SubscriberRegistryBuilder`] and is immutable afterwards, so handler
//! identity never changes while a publish is in flight.

use std::fmt;
use std::sync::Arc;

use pulse_core::error::DomainError;
use pulse_core::logged::EventLoggedListener;
use pulse_core::subscriber::Subscriber;

use crate::pattern::EventPattern;

struct Registration {
    pattern: EventPattern,
    subscriber: Arc<dyn Subscriber>,
}

/// Immutable mapping from event patterns to ordered handlers.
pub struct SubscriberRegistry {
    registrations: Vec<Registration>,
    listeners: Vec<Arc<dyn EventLoggedListener>>,
}

impl SubscriberRegistry {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> SubscriberRegistryBuilder {
        SubscriberRegistryBuilder::default()
    }

    /// A registry with no subscribers and no listeners.
    #[must_use]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Subscribers whose pattern matches `event_name`, in registration order.
    pub fn matching<'a>(
        &'a self,
        event_name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<dyn Subscriber>> + 'a {
        self.registrations
            .iter()
            .filter(move |r| r.pattern.matches(event_name))
            .map(|r| &r.subscriber)
    }

    /// Audit-completion listeners, in registration order.
    #[must_use]
    pub fn listeners(&self) -> &[Arc<dyn EventLoggedListener>] {
        &self.listeners
    }

    /// Number of subscriber registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` when no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscriptions: Vec<String> = self
            .registrations
            .iter()
            .map(|r| format!("{} -> {}", r.pattern, r.subscriber.name()))
            .collect();
        let listeners: Vec<&str> = self.listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("SubscriberRegistry")
            .field("subscriptions", &subscriptions)
            .field("listeners", &listeners)
            .finish()
    }
}

/// Collects registrations before the registry is frozen.
#[derive(Default)]
pub struct SubscriberRegistryBuilder {
    registrations: Vec<Registration>,
    listeners: Vec<Arc<dyn EventLoggedListener>>,
}

impl SubscriberRegistryBuilder {
    /// Registers `subscriber` for events matching `pattern`
    /// (`Domain.Entity.Action`, `Domain.*`, or `*`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `pattern` is malformed.
    pub fn subscribe(
        self,
        pattern: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<Self, DomainError> {
        Ok(self.subscribe_pattern(pattern.parse()?, subscriber))
    }

    /// Registers `subscriber` for an already parsed pattern.
    #[must_use]
    pub fn subscribe_pattern(mut self, pattern: EventPattern, subscriber: Arc<dyn Subscriber>) -> Self {
        self.registrations.push(Registration { pattern, subscriber });
        self
    }

    /// Registers a listener for `EventLogged` notifications.
    #[must_use]
    pub fn on_logged(mut self, listener: Arc<dyn EventLoggedListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> SubscriberRegistry {
        SubscriberRegistry {
            registrations: self.registrations,
            listeners: self.listeners,
        }
    }
}
