//! The event bus.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use pulse_core::audit::{AppendOutcome, AuditRecord, AuditSink};
use pulse_core::error::DomainError;
use pulse_core::event::DomainEvent;
use pulse_core::logged::EventLogged;
use pulse_core::subscriber::SubscriberError;
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::BusConfig;
use crate::registry::SubscriberRegistry;
use crate::report::{FailureKind, PublishReport, SubscriberFailure};

/// Single call-through point for publishing domain events.
///
/// `publish` blocks its caller until subscribers have run and the audit
/// record is written. Callers inside a database transaction should record
/// events in a [`crate::PendingEvents`] and flush after commit.
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<SubscriberRegistry>,
    sink: Arc<dyn AuditSink>,
    config: BusConfig,
}

impl EventBus {
    /// Creates a bus over a frozen registry and an audit sink.
    #[must_use]
    pub fn new(registry: Arc<SubscriberRegistry>, sink: Arc<dyn AuditSink>, config: BusConfig) -> Self {
        Self {
            registry,
            sink,
            config,
        }
    }

    /// Returns the registry this bus dispatches to.
    #[must_use]
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Publishes `event`.
    ///
    /// In order: notifies matching subscribers one at a time in
    /// registration order, appends the audit record, and on a newly written
    /// record notifies `EventLogged` listeners. Subscriber errors, panics and
    /// timeouts are collected in the returned report and never stop the
    /// audit write. Republishing an already audited event id is a no-op
    /// success reported as a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AuditPersistence` if the audit record could not
    /// be written.
    pub async fn publish(&self, event: &dyn DomainEvent) -> Result<PublishReport, DomainError> {
        let event_id = event.metadata().event_id;
        let event_name = event.event_name();
        let span = tracing::info_span!("publish", %event_id, event_name);

        async move {
            let payload = Arc::new(event.to_serialized());

            let mut subscribers_notified = 0;
            let mut failures = Vec::new();
            for subscriber in self.registry.matching(event_name) {
                subscribers_notified += 1;
                let name = subscriber.name().to_owned();
                let subscriber = Arc::clone(subscriber);
                let payload = Arc::clone(&payload);
                let outcome = run_isolated(self.config.subscriber_timeout, async move {
                    subscriber.handle(&payload).await
                })
                .await;
                if let Err(kind) = outcome {
                    tracing::warn!(subscriber = %name, error = %kind, "subscriber failed");
                    failures.push(SubscriberFailure {
                        subscriber: name,
                        kind,
                    });
                }
            }

            let record = AuditRecord::from_event(event, (*payload).clone());
            let audit = self
                .sink
                .append(&record)
                .await
                .map_err(|e| into_audit_error(e, event_id.to_string()))
                .inspect_err(|e| tracing::error!(error = %e, "audit write failed"))?;

            let listener_failures = match audit {
                AppendOutcome::Inserted => self.notify_logged(&record).await,
                AppendOutcome::Duplicate => {
                    tracing::debug!("event already audited, skipping EventLogged");
                    Vec::new()
                }
            };

            if !failures.is_empty() {
                tracing::warn!(
                    failed = failures.len(),
                    notified = subscribers_notified,
                    "event published with subscriber failures"
                );
            }
            tracing::info!(notified = subscribers_notified, ?audit, "event published");

            Ok(PublishReport {
                event_id,
                event_name,
                subscribers_notified,
                failures,
                audit,
                listener_failures,
            })
        }
        .instrument(span)
        .await
    }

    async fn notify_logged(&self, record: &AuditRecord) -> Vec<SubscriberFailure> {
        let logged = Arc::new(EventLogged::from(record));
        let mut failures = Vec::new();
        for listener in self.registry.listeners() {
            let name = listener.name().to_owned();
            let listener = Arc::clone(listener);
            let logged = Arc::clone(&logged);
            let outcome = run_isolated(self.config.listener_timeout, async move {
                listener.on_logged(&logged).await
            })
            .await;
            if let Err(kind) = outcome {
                tracing::warn!(listener = %name, error = %kind, "EventLogged listener failed");
                failures.push(SubscriberFailure {
                    subscriber: name,
                    kind,
                });
            }
        }
        failures
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Runs a handler on its own task so a panic or overrun cannot take the
/// publisher down with it.
///
/// A handler that blocks its worker thread cannot be preempted; if it
/// returns after its budget it is still reported as timed out.
async fn run_isolated<F>(limit: Duration, handler: F) -> Result<(), FailureKind>
where
    F: Future<Output = Result<(), SubscriberError>> + Send + 'static,
{
    let started = Instant::now();
    let handle = tokio::spawn(handler.in_current_span());
    let abort = handle.abort_handle();
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(_)) if started.elapsed() > limit => Err(FailureKind::TimedOut(limit)),
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => Err(FailureKind::Failed(e.to_string())),
        Ok(Err(join)) if join.is_panic() => Err(FailureKind::Panicked),
        Ok(Err(join)) => Err(FailureKind::Failed(join.to_string())),
        Err(_) => {
            abort.abort();
            Err(FailureKind::TimedOut(limit))
        }
    }
}

fn into_audit_error(error: DomainError, event_id: String) -> DomainError {
    match error {
        DomainError::AuditPersistence { .. } => error,
        other => DomainError::AuditPersistence {
            event_id,
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pulse_core::audit::AppendOutcome;
    use pulse_core::error::DomainError;
    use async_trait::async_trait;
    use pulse_core::event::{DomainEvent, SerializedEvent};
    use pulse_core::subscriber::{FnSubscriber, Subscriber, SubscriberError};
    use pulse_test_support::{
        CallJournal, FailingAuditSink, FailingLoggedListener, FailingSubscriber, FixedClock,
        PanickingSubscriber, RecordingAuditSink, RecordingLoggedListener, RecordingSubscriber,
        StallingSubscriber, TestEvent,
    };

    use super::EventBus;
    use crate::config::BusConfig;
    use crate::registry::{SubscriberRegistry, SubscriberRegistryBuilder};
    use crate::report::FailureKind;

    /// Blocks its worker thread instead of yielding.
    struct ThreadBlockingSubscriber;

    #[async_trait]
    impl Subscriber for ThreadBlockingSubscriber {
        fn name(&self) -> &str {
            "thread-blocker"
        }

        async fn handle(&self, _event: &SerializedEvent) -> Result<(), SubscriberError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        }
    }

    fn short_timeouts() -> BusConfig {
        BusConfig {
            subscriber_timeout: Duration::from_millis(100),
            listener_timeout: Duration::from_millis(100),
        }
    }

    fn bus_with(builder: SubscriberRegistryBuilder, sink: &Arc<RecordingAuditSink>) -> EventBus {
        EventBus::new(Arc::new(builder.build()), sink.clone(), short_timeouts())
    }

    fn task_completed() -> TestEvent {
        TestEvent::new("Project.Task.Completed", "task-1", "proj-1", &FixedClock::default())
    }

    #[tokio::test]
    async fn test_publish_writes_one_audit_record_and_one_logged_notification() {
        // Arrange
        let sink = Arc::new(RecordingAuditSink::new());
        let listener = Arc::new(RecordingLoggedListener::new());
        let bus = bus_with(SubscriberRegistry::builder().on_logged(listener.clone()), &sink);
        let event = task_completed();

        // Act
        let report = bus.publish(&event).await.unwrap();

        // Assert
        assert!(report.is_clean());
        assert_eq!(report.audit, AppendOutcome::Inserted);
        assert_eq!(report.subscribers_notified, 0);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_id, event.metadata().event_id);
        assert_eq!(records[0].event_name, "Project.Task.Completed");
        assert_eq!(records[0].source_module, "test");

        let logged = listener.logged();
        assert_eq!(logged.len(), 1);
        let expected_id = event.metadata().event_id.to_string();
        assert_eq!(logged[0].event_id(), Some(expected_id.as_str()));
    }

    #[tokio::test]
    async fn test_republishing_same_event_is_idempotent() {
        // Arrange
        let sink = Arc::new(RecordingAuditSink::new());
        let listener = Arc::new(RecordingLoggedListener::new());
        let bus = bus_with(SubscriberRegistry::builder().on_logged(listener.clone()), &sink);
        let event = task_completed();

        // Act
        let first = bus.publish(&event).await.unwrap();
        let second = bus.publish(&event).await.unwrap();

        // Assert
        assert!(!first.was_duplicate());
        assert!(second.was_duplicate());
        assert_eq!(sink.append_attempts(), 2);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(listener.logged().len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_run_in_registration_order() {
        // Arrange
        let journal = CallJournal::new();
        let sink = Arc::new(RecordingAuditSink::new());
        let builder = SubscriberRegistry::builder()
            .subscribe("Project.Task.Completed", Arc::new(RecordingSubscriber::new("A", &journal)))
            .unwrap()
            .subscribe("Project.Task.Completed", Arc::new(RecordingSubscriber::new("B", &journal)))
            .unwrap();
        let bus = bus_with(builder, &sink);

        // Act
        let report = bus.publish(&task_completed()).await.unwrap();

        // Assert
        assert_eq!(journal.entries(), vec!["A", "B"]);
        assert_eq!(report.subscribers_notified, 2);
    }

    #[tokio::test]
    async fn test_failing_subscriber_does_not_block_others_or_audit() {
        // Arrange
        let journal = CallJournal::new();
        let sink = Arc::new(RecordingAuditSink::new());
        let after = Arc::new(RecordingSubscriber::new("after", &journal));
        let builder = SubscriberRegistry::builder()
            .subscribe("Project.*", Arc::new(FailingSubscriber::new("broken", &journal)))
            .unwrap()
            .subscribe("Project.*", after.clone())
            .unwrap();
        let bus = bus_with(builder, &sink);

        // Act
        let report = bus.publish(&task_completed()).await.unwrap();

        // Assert
        assert_eq!(journal.entries(), vec!["broken", "after"]);
        assert_eq!(after.received().len(), 1);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].subscriber, "broken");
        assert!(matches!(report.failures[0].kind, FailureKind::Failed(_)));
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_isolated() {
        let journal = CallJournal::new();
        let sink = Arc::new(RecordingAuditSink::new());
        let builder = SubscriberRegistry::builder()
            .subscribe("*", Arc::new(PanickingSubscriber("kaboom".into())))
            .unwrap()
            .subscribe("*", Arc::new(RecordingSubscriber::new("survivor", &journal)))
            .unwrap();
        let bus = bus_with(builder, &sink);

        let report = bus.publish(&task_completed()).await.unwrap();

        assert_eq!(report.failures[0].kind, FailureKind::Panicked);
        assert_eq!(journal.entries(), vec!["survivor"]);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_stalled_subscriber_times_out_without_hanging_the_bus() {
        let sink = Arc::new(RecordingAuditSink::new());
        let builder = SubscriberRegistry::builder()
            .subscribe("Project.*", Arc::new(StallingSubscriber("sleepy".into())))
            .unwrap();
        let bus = bus_with(builder, &sink);

        let report = bus.publish(&task_completed()).await.unwrap();

        assert_eq!(
            report.failures[0].kind,
            FailureKind::TimedOut(Duration::from_millis(100))
        );
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_non_matching_subscribers_are_skipped() {
        let journal = CallJournal::new();
        let sink = Arc::new(RecordingAuditSink::new());
        let builder = SubscriberRegistry::builder()
            .subscribe("ChangeRequest.*", Arc::new(RecordingSubscriber::new("cr", &journal)))
            .unwrap();
        let bus = bus_with(builder, &sink);

        let report = bus.publish(&task_completed()).await.unwrap();

        assert_eq!(report.subscribers_notified, 0);
        assert!(journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_receive_serialized_event() {
        let journal = CallJournal::new();
        let sink = Arc::new(RecordingAuditSink::new());
        let subscriber = Arc::new(RecordingSubscriber::new("reader", &journal));
        let builder = SubscriberRegistry::builder()
            .subscribe("Project.Task.Completed", subscriber.clone())
            .unwrap();
        let bus = bus_with(builder, &sink);
        let event = task_completed();

        bus.publish(&event).await.unwrap();

        let received = subscriber.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], event.to_serialized());
        assert_eq!(received[0], sink.records()[0].payload);
    }

    #[tokio::test]
    async fn test_audit_failure_is_fatal_after_subscribers_ran() {
        // Arrange
        let journal = CallJournal::new();
        let listener = Arc::new(RecordingLoggedListener::new());
        let registry = SubscriberRegistry::builder()
            .subscribe("*", Arc::new(RecordingSubscriber::new("first", &journal)))
            .unwrap()
            .on_logged(listener.clone())
            .build();
        let bus = EventBus::new(Arc::new(registry), Arc::new(FailingAuditSink), short_timeouts());
        let event = task_completed();

        // Act
        let result = bus.publish(&event).await;

        // Assert
        match result {
            Err(DomainError::AuditPersistence { event_id, .. }) => {
                assert_eq!(event_id, event.metadata().event_id.to_string());
            }
            other => panic!("expected AuditPersistence, got {other:?}"),
        }
        assert_eq!(journal.entries(), vec!["first"]);
        assert!(listener.logged().is_empty());
    }

    #[tokio::test]
    async fn test_failing_listener_is_reported_but_not_fatal() {
        let sink = Arc::new(RecordingAuditSink::new());
        let recording = Arc::new(RecordingLoggedListener::new());
        let builder = SubscriberRegistry::builder()
            .on_logged(Arc::new(FailingLoggedListener))
            .on_logged(recording.clone());
        let bus = bus_with(builder, &sink);

        let report = bus.publish(&task_completed()).await.unwrap();

        assert_eq!(report.listener_failures.len(), 1);
        assert_eq!(report.listener_failures[0].subscriber, "failing");
        assert!(report.failures.is_empty());
        assert!(!report.is_clean());
        assert_eq!(recording.logged().len(), 1);
    }

    #[tokio::test]
    async fn test_blocking_closure_subscriber_times_out_without_stalling_publish() {
        // Arrange
        let journal = CallJournal::new();
        let sink = Arc::new(RecordingAuditSink::new());
        let blocking = FnSubscriber::new("blocking-closure", |_event: &SerializedEvent| {
            std::thread::sleep(Duration::from_millis(800));
            Ok(())
        });
        let builder = SubscriberRegistry::builder()
            .subscribe("Project.*", Arc::new(blocking))
            .unwrap()
            .subscribe("Project.*", Arc::new(RecordingSubscriber::new("next", &journal)))
            .unwrap();
        let bus = bus_with(builder, &sink);
        let started = std::time::Instant::now();

        // Act
        let report = bus.publish(&task_completed()).await.unwrap();

        // Assert
        assert!(started.elapsed() < Duration::from_millis(600));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].subscriber, "blocking-closure");
        assert_eq!(
            report.failures[0].kind,
            FailureKind::TimedOut(Duration::from_millis(100))
        );
        assert_eq!(journal.entries(), vec!["next"]);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_thread_blocking_subscriber_over_budget_is_reported_as_timed_out() {
        let sink = Arc::new(RecordingAuditSink::new());
        let builder = SubscriberRegistry::builder()
            .subscribe("*", Arc::new(ThreadBlockingSubscriber))
            .unwrap();
        let bus = bus_with(builder, &sink);

        let report = bus.publish(&task_completed()).await.unwrap();

        assert_eq!(
            report.failures[0].kind,
            FailureKind::TimedOut(Duration::from_millis(100))
        );
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishes_of_one_event_audit_and_notify_once() {
        // Arrange
        let sink = Arc::new(RecordingAuditSink::new());
        let listener = Arc::new(RecordingLoggedListener::new());
        let bus = bus_with(SubscriberRegistry::builder().on_logged(listener.clone()), &sink);
        let event = Arc::new(task_completed());

        // Act
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let bus = bus.clone();
                let event = Arc::clone(&event);
                tokio::spawn(async move { bus.publish(&*event).await })
            })
            .collect();
        let mut reports = Vec::new();
        for task in tasks {
            reports.push(task.await.unwrap().unwrap());
        }

        // Assert
        let inserted = reports
            .iter()
            .filter(|r| r.audit == AppendOutcome::Inserted)
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(reports.iter().filter(|r| r.was_duplicate()).count(), 7);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(listener.logged().len(), 1);
    }
}
