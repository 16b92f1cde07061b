// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fakes::{
    ContendedRepository, FlakySaveRepository, RecordingPublisher, ScriptedSender,
};
use super::helpers::{pending_notification, setup_db};
use chrono::{Duration as ChronoDuration, Utc};
use learnhub::domain::models::notification::NotificationStatus;
use learnhub::domain::models::notification_event::NotificationEventType;
use learnhub::domain::repositories::notification_repository::NotificationRepository;
use learnhub::domain::services::notification_sender::SenderError;
use learnhub::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
use learnhub::utils::retry_policy::RetryPolicy;
use learnhub::workers::delivery_dispatcher::{DeliveryDispatcher, DispatchOutcome, DispatcherConfig};
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    repo: Arc<NotificationRepositoryImpl>,
    sender: Arc<ScriptedSender>,
    publisher: Arc<RecordingPublisher>,
    dispatcher: DeliveryDispatcher,
}

async fn fixture_with(sender: ScriptedSender, config: DispatcherConfig) -> Fixture {
    let db = setup_db().await;
    let repo = Arc::new(NotificationRepositoryImpl::new(db));
    let sender = Arc::new(sender);
    let publisher = Arc::new(RecordingPublisher::new());
    let dispatcher =
        DeliveryDispatcher::new(repo.clone(), sender.clone(), publisher.clone(), config);
    Fixture {
        repo,
        sender,
        publisher,
        dispatcher,
    }
}

async fn fixture() -> Fixture {
    fixture_with(ScriptedSender::new(), DispatcherConfig::default()).await
}

#[tokio::test]
async fn test_batch_isolates_individual_failures() {
    // Given: three pending notifications, the second one is rejected by its provider
    let f = fixture().await;
    let first = pending_notification("user-1", "email", 30);
    let second = pending_notification("user-2", "sms", 20);
    let third = pending_notification("user-3", "push", 10);
    for n in [&first, &second, &third] {
        f.repo.save(n).await.unwrap();
    }
    f.sender.fail(
        second.id,
        SenderError::Delivery("invalid phone number".to_string()),
    );

    // When: one batch is processed
    let report = f.dispatcher.process_pending(10).await.unwrap();

    // Then: the other two are sent and the failure is recorded
    assert_eq!(report.fetched, 3);
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.first_error.as_deref(), Some("invalid phone number"));

    let first = f.repo.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(first.status, NotificationStatus::Sent);
    assert!(first.sent_at.is_some());

    let second = f.repo.find_by_id(second.id).await.unwrap().unwrap();
    assert_eq!(second.status, NotificationStatus::Failed);
    assert_eq!(second.failure_reason.as_deref(), Some("invalid phone number"));
    assert!(second.sent_at.is_none());

    let third = f.repo.find_by_id(third.id).await.unwrap().unwrap();
    assert_eq!(third.status, NotificationStatus::Sent);

    // sent in creation order, one SENT event per success
    assert_eq!(f.sender.sent(), vec![first.id, third.id]);
    assert_eq!(
        f.publisher.event_types(),
        vec![NotificationEventType::Sent, NotificationEventType::Sent]
    );
    let event = &f.publisher.events()[0];
    assert_eq!(event.notification.id, first.id);
    assert_eq!(event.notification.status, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_batch_respects_limit_and_creation_order() {
    let f = fixture().await;
    let oldest = pending_notification("user-1", "email", 300);
    let middle = pending_notification("user-1", "email", 200);
    let newest = pending_notification("user-1", "email", 100);
    for n in [&newest, &oldest, &middle] {
        f.repo.save(n).await.unwrap();
    }

    let report = f.dispatcher.process_pending(2).await.unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(f.sender.sent(), vec![oldest.id, middle.id]);
    let newest = f.repo.find_by_id(newest.id).await.unwrap().unwrap();
    assert_eq!(newest.status, NotificationStatus::Pending);
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let f = fixture().await;

    let report = f.dispatcher.process_pending(0).await.unwrap();

    assert_eq!(report.fetched, 0);
    assert_eq!(report.processed(), 0);
    assert!(f.publisher.events().is_empty());
}

#[tokio::test]
async fn test_send_timeout_marks_failed() {
    // Given: a provider slower than the send timeout
    let config = DispatcherConfig {
        send_timeout: Duration::from_millis(20),
        ..DispatcherConfig::default()
    };
    let f = fixture_with(ScriptedSender::with_delay(Duration::from_millis(500)), config).await;
    let n = pending_notification("user-1", "email", 5);
    f.repo.save(&n).await.unwrap();

    // When
    let report = f.dispatcher.process_pending(10).await.unwrap();

    // Then: the notification is failed with a timeout reason and no event is published
    assert_eq!(report.failed, 1);
    let stored = f.repo.find_by_id(n.id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Failed);
    assert!(stored
        .failure_reason
        .as_deref()
        .is_some_and(|r| r.contains("timed out")));
    assert!(f.publisher.events().is_empty());
}

#[tokio::test]
async fn test_unavailable_provider_defers_notification() {
    let f = fixture().await;
    let n = pending_notification("user-1", "sms", 5);
    f.repo.save(&n).await.unwrap();
    f.sender
        .fail(n.id, SenderError::Unavailable("503 Service Unavailable".to_string()));

    let report = f.dispatcher.process_pending(10).await.unwrap();

    assert_eq!(report.deferred, 1);
    assert_eq!(report.failed, 0);
    let stored = f.repo.find_by_id(n.id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Pending);
    assert!(stored.failure_reason.is_none());
}

#[tokio::test]
async fn test_lost_claim_is_skipped() {
    // Given: another dispatcher claims every notification right after it is read
    let db = setup_db().await;
    let inner = Arc::new(NotificationRepositoryImpl::new(db));
    let sender = Arc::new(ScriptedSender::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let dispatcher = DeliveryDispatcher::new(
        Arc::new(ContendedRepository::new(inner.clone())),
        sender.clone(),
        publisher.clone(),
        DispatcherConfig::default(),
    );
    let n = pending_notification("user-1", "push", 5);
    inner.save(&n).await.unwrap();

    // When
    let report = dispatcher.process_pending(10).await.unwrap();

    // Then: nothing is sent twice
    assert_eq!(report.skipped, 1);
    assert!(sender.sent().is_empty());
    assert!(publisher.events().is_empty());
    let stored = inner.find_by_id(n.id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Processing);
}

#[tokio::test]
async fn test_future_scheduled_notification_is_not_fetched() {
    let f = fixture().await;
    let mut later = pending_notification("user-1", "email", 5);
    later.scheduled_at = Some(Utc::now() + ChronoDuration::hours(1));
    let mut due = pending_notification("user-1", "email", 4);
    due.scheduled_at = Some(Utc::now() - ChronoDuration::minutes(1));
    f.repo.save(&later).await.unwrap();
    f.repo.save(&due).await.unwrap();

    let report = f.dispatcher.process_pending(10).await.unwrap();

    assert_eq!(report.fetched, 1);
    assert_eq!(f.sender.sent(), vec![due.id]);
    assert_eq!(
        f.dispatcher.dispatch_one(later.id).await.unwrap(),
        DispatchOutcome::Skipped
    );
}

#[tokio::test]
async fn test_dispatch_one_delivers_queued_notification() {
    let f = fixture().await;
    let n = pending_notification("user-1", "email", 5);
    f.repo.save(&n).await.unwrap();

    assert_eq!(
        f.dispatcher.dispatch_one(n.id).await.unwrap(),
        DispatchOutcome::Sent
    );
    // a second delivery of the same id is skipped
    assert_eq!(
        f.dispatcher.dispatch_one(n.id).await.unwrap(),
        DispatchOutcome::Skipped
    );
    assert_eq!(
        f.dispatcher.dispatch_one(uuid::Uuid::new_v4()).await.unwrap(),
        DispatchOutcome::Skipped
    );
    assert_eq!(f.sender.sent(), vec![n.id]);
}

#[tokio::test]
async fn test_publish_failure_keeps_sent_status() {
    let db = setup_db().await;
    let repo = Arc::new(NotificationRepositoryImpl::new(db));
    let dispatcher = DeliveryDispatcher::new(
        repo.clone(),
        Arc::new(ScriptedSender::new()),
        Arc::new(RecordingPublisher::failing()),
        DispatcherConfig::default(),
    );
    let n = pending_notification("user-1", "email", 5);
    repo.save(&n).await.unwrap();

    let report = dispatcher.process_pending(10).await.unwrap();

    assert_eq!(report.sent, 1);
    assert!(report.first_error.is_some());
    let stored = repo.find_by_id(n.id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_batch_size_is_clamped() {
    let f = fixture_with(
        ScriptedSender::new(),
        DispatcherConfig {
            default_batch_size: 25,
            max_batch_size: 100,
            ..DispatcherConfig::default()
        },
    )
    .await;

    assert_eq!(f.dispatcher.effective_batch_size(0), 25);
    assert_eq!(f.dispatcher.effective_batch_size(10), 10);
    assert_eq!(f.dispatcher.effective_batch_size(1_000), 100);
}

fn fast_persist_retry(max_retries: u32) -> DispatcherConfig {
    DispatcherConfig {
        persist_retry: RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        },
        ..DispatcherConfig::default()
    }
}

async fn sent_with_flaky_save(failures: u32, max_retries: u32) {
    // Given: the first `failures` status writes fail after a successful send
    let db = setup_db().await;
    let inner = Arc::new(NotificationRepositoryImpl::new(db));
    let repo = Arc::new(FlakySaveRepository::new(inner.clone(), failures));
    let sender = Arc::new(ScriptedSender::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let dispatcher = DeliveryDispatcher::new(
        repo.clone(),
        sender.clone(),
        publisher.clone(),
        fast_persist_retry(max_retries),
    );
    let n = pending_notification("user-1", "email", 5);
    inner.save(&n).await.unwrap();

    // When: a batch runs, every claim is reaped and another batch runs
    let report = dispatcher.process_pending(10).await.unwrap();
    let stored = inner.find_by_id(n.id).await.unwrap().unwrap();
    inner
        .release_stale_claims(ChronoDuration::seconds(-1))
        .await
        .unwrap();
    let second = dispatcher.process_pending(10).await.unwrap();

    // Then: the notification is SENT and delivered exactly once
    assert_eq!(report.sent, 1);
    assert!(report.first_error.is_none());
    assert_eq!(stored.status, NotificationStatus::Sent);
    assert!(stored.sent_at.is_some());
    assert_eq!(second.fetched, 0);
    assert_eq!(sender.sent(), vec![n.id]);
    assert_eq!(publisher.events().len(), 1);
}

#[tokio::test]
async fn test_sent_status_write_is_retried() {
    sent_with_flaky_save(1, 3).await;
}

#[tokio::test]
async fn test_sent_status_falls_back_to_claim_completion() {
    // every save attempt fails; the conditional update still records SENT
    sent_with_flaky_save(u32::MAX, 2).await;
}

#[tokio::test]
async fn test_failed_status_write_is_retried() {
    let db = setup_db().await;
    let inner = Arc::new(NotificationRepositoryImpl::new(db));
    let repo = Arc::new(FlakySaveRepository::new(inner.clone(), 2));
    let sender = Arc::new(ScriptedSender::new());
    let dispatcher = DeliveryDispatcher::new(
        repo.clone(),
        sender.clone(),
        Arc::new(RecordingPublisher::new()),
        fast_persist_retry(3),
    );
    let n = pending_notification("user-1", "sms", 5);
    inner.save(&n).await.unwrap();
    sender.fail(n.id, SenderError::Delivery("unknown number".to_string()));

    let report = dispatcher.process_pending(10).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(repo.save_calls(), 3);
    let stored = inner.find_by_id(n.id).await.unwrap().unwrap();
    assert_eq!(stored.status, NotificationStatus::Failed);
}
