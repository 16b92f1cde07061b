// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fakes::{RecordingPublisher, ScriptedSender};
use super::helpers::{pending_notification, setup_db};
use async_trait::async_trait;
use learnhub::domain::models::notification::NotificationStatus;
use learnhub::domain::repositories::notification_repository::NotificationRepository;
use learnhub::infrastructure::repositories::notification_repo_impl::NotificationRepositoryImpl;
use learnhub::queue::notification_queue::{InMemoryNotificationQueue, NotificationQueue};
use learnhub::utils::errors::WorkerError;
use learnhub::utils::retry_policy::RetryPolicy;
use learnhub::workers::delivery_dispatcher::{DeliveryDispatcher, DispatcherConfig};
use learnhub::workers::manager::WorkerManager;
use learnhub::workers::queue_consumer::QueueConsumerWorker;
use learnhub::workers::sweep_worker::DispatchSweepWorker;
use learnhub::workers::worker::Worker;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

fn fast_restarts(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
        backoff_multiplier: 2.0,
        jitter_factor: 0.0,
    }
}

/// 前 `failures` 次运行直接失败，之后等待关闭信号
struct FlakyWorker {
    failures: u32,
    runs: AtomicU32,
}

#[async_trait]
impl Worker for FlakyWorker {
    async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst);
        if run < self.failures {
            return Err(WorkerError::InternalError(format!("crash #{}", run + 1)));
        }
        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// 忽略关闭信号的工作器
struct StubbornWorker;

#[async_trait]
impl Worker for StubbornWorker {
    async fn run(&self, _shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "stubborn"
    }
}

async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

#[tokio::test]
async fn test_failed_worker_is_restarted() {
    // Given: a worker that crashes twice before running normally
    let worker = Arc::new(FlakyWorker {
        failures: 2,
        runs: AtomicU32::new(0),
    });
    let mut manager = WorkerManager::new(fast_restarts(5), Duration::from_secs(1));
    manager.register(worker.clone());

    // When
    manager.start();
    let observed = worker.clone();
    wait_until(|| {
        let observed = observed.clone();
        async move { observed.runs.load(Ordering::SeqCst) >= 3 }
    })
    .await;

    // Then: it was restarted and stops cleanly
    assert!(manager.is_running());
    assert!(manager.stop().await);
    assert!(!manager.is_running());
    assert_eq!(worker.runs.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_restart_limit_is_respected() {
    let worker = Arc::new(FlakyWorker {
        failures: u32::MAX,
        runs: AtomicU32::new(0),
    });
    let mut manager = WorkerManager::new(fast_restarts(2), Duration::from_secs(1));
    manager.register(worker.clone());

    manager.start();
    tokio::time::sleep(Duration::from_millis(200)).await;

    // initial run plus two restarts
    assert_eq!(worker.runs.load(Ordering::SeqCst), 3);
    assert!(manager.stop().await);
}

#[tokio::test]
async fn test_stop_aborts_workers_that_do_not_drain() {
    let mut manager = WorkerManager::new(fast_restarts(0), Duration::from_millis(50));
    manager.register(Arc::new(StubbornWorker));
    manager.start();

    assert!(!manager.stop().await);
    assert!(!manager.is_running());
}

#[tokio::test]
async fn test_queue_consumer_and_sweep_deliver_notifications() {
    // Given: one queued notification and one that only the sweep can find
    let repo = Arc::new(NotificationRepositoryImpl::new(setup_db().await));
    let sender = Arc::new(ScriptedSender::new());
    let dispatcher = Arc::new(DeliveryDispatcher::new(
        repo.clone(),
        sender.clone(),
        Arc::new(RecordingPublisher::new()),
        DispatcherConfig::default(),
    ));
    let queue = Arc::new(InMemoryNotificationQueue::new());

    let queued = pending_notification("user-1", "email", 10);
    let unqueued = pending_notification("user-2", "sms", 5);
    repo.save(&queued).await.unwrap();
    repo.save(&unqueued).await.unwrap();
    queue.enqueue(queued.id).await.unwrap();
    // unknown ids are skipped
    queue.enqueue(Uuid::new_v4()).await.unwrap();

    let mut manager = WorkerManager::new(fast_restarts(1), Duration::from_secs(2));
    manager.register(Arc::new(QueueConsumerWorker::new(
        queue,
        dispatcher.clone(),
        Duration::from_millis(20),
    )));
    manager.register(Arc::new(DispatchSweepWorker::new(
        repo.clone(),
        dispatcher,
        Duration::from_millis(25),
        Duration::from_secs(60),
        0,
    )));

    // When
    manager.start();
    let observed = sender.clone();
    wait_until(|| {
        let observed = observed.clone();
        async move { observed.sent().len() >= 2 }
    })
    .await;

    // Then: both are sent exactly once
    assert!(manager.stop().await);
    let mut sent = sender.sent();
    sent.sort();
    let mut expected = vec![queued.id, unqueued.id];
    expected.sort();
    assert_eq!(sent, expected);
    for id in expected {
        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
    }
}
