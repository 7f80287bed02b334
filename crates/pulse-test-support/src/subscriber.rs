//! Test subscribers and listeners.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::event::SerializedEvent;
use pulse_core::logged::{EventLogged, EventLoggedListener};
use pulse_core::subscriber::{Subscriber, SubscriberError};

/// Shared, ordered log of which subscriber ran, for ordering assertions.
#[derive(Debug, Clone, Default)]
pub struct CallJournal(Arc<Mutex<Vec<String>>>);

impl CallJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_owned());
    }

    /// Returns the names recorded so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A subscriber that stores every event it receives and writes its name to
/// a journal.
#[derive(Debug)]
pub struct RecordingSubscriber {
    name: String,
    journal: CallJournal,
    received: Mutex<Vec<SerializedEvent>>,
}

impl RecordingSubscriber {
    /// Creates a subscriber writing to `journal`.
    #[must_use]
    pub fn new(name: &str, journal: &CallJournal) -> Self {
        Self {
            name: name.to_owned(),
            journal: journal.clone(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of received events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn received(&self) -> Vec<SerializedEvent> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Subscriber for RecordingSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &SerializedEvent) -> Result<(), SubscriberError> {
        self.journal.push(&self.name);
        self.received.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A subscriber that journals its call and then returns an error.
#[derive(Debug)]
pub struct FailingSubscriber {
    name: String,
    journal: CallJournal,
}

impl FailingSubscriber {
    /// Creates a failing subscriber writing to `journal`.
    #[must_use]
    pub fn new(name: &str, journal: &CallJournal) -> Self {
        Self {
            name: name.to_owned(),
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl Subscriber for FailingSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _event: &SerializedEvent) -> Result<(), SubscriberError> {
        self.journal.push(&self.name);
        Err(SubscriberError::new("projection store unavailable"))
    }
}

/// A subscriber that panics.
#[derive(Debug)]
pub struct PanickingSubscriber(pub String);

#[async_trait]
impl Subscriber for PanickingSubscriber {
    fn name(&self) -> &str {
        &self.0
    }

    async fn handle(&self, _event: &SerializedEvent) -> Result<(), SubscriberError> {
        panic!("subscriber {} blew up", self.0);
    }
}

/// A subscriber that sleeps far longer than any reasonable timeout.
#[derive(Debug)]
pub struct StallingSubscriber(pub String);

#[async_trait]
impl Subscriber for StallingSubscriber {
    fn name(&self) -> &str {
        &self.0
    }

    async fn handle(&self, _event: &SerializedEvent) -> Result<(), SubscriberError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// An `EventLogged` listener that records every notification.
#[derive(Debug, Default)]
pub struct RecordingLoggedListener {
    logged: Mutex<Vec<EventLogged>>,
}

impl RecordingLoggedListener {
    /// Creates an empty listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of received notifications.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn logged(&self) -> Vec<EventLogged> {
        self.logged.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLoggedListener for RecordingLoggedListener {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn on_logged(&self, logged: &EventLogged) -> Result<(), SubscriberError> {
        self.logged.lock().unwrap().push(logged.clone());
        Ok(())
    }
}

/// An `EventLogged` listener that always fails.
#[derive(Debug)]
pub struct FailingLoggedListener;

#[async_trait]
impl EventLoggedListener for FailingLoggedListener {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn on_logged(&self, _logged: &EventLogged) -> Result<(), SubscriberError> {
        Err(SubscriberError::new("queue unavailable"))
    }
}
