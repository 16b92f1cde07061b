// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use learnhub::domain::models::notification::Notification;
use learnhub::domain::models::notification_event::{NotificationEvent, NotificationEventType};
use learnhub::domain::repositories::notification_repository::NotificationRepository;
use learnhub::domain::services::event_publisher::{EventPublisher, PublishError};
use learnhub::domain::services::notification_sender::{NotificationSender, SenderError};
use learnhub::utils::errors::RepositoryError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// 按通知ID返回预设结果的发送器，未预设的通知发送成功
#[derive(Default)]
pub struct ScriptedSender {
    failures: Mutex<HashMap<Uuid, SenderError>>,
    delay: Option<Duration>,
    sent: Mutex<Vec<Uuid>>,
}

impl ScriptedSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次发送前等待指定时间
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail(&self, id: Uuid, error: SenderError) {
        self.failures.lock().unwrap().insert(id, error);
    }

    pub fn sent(&self) -> Vec<Uuid> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for ScriptedSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.lock().unwrap().get(&notification.id) {
            return Err(error.clone());
        }
        self.sent.lock().unwrap().push(notification.id);
        Ok(())
    }
}

/// 记录所有已发布事件的发布器
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<NotificationEvent>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_types(&self) -> Vec<NotificationEventType> {
        self.events().iter().map(|e| e.event_type).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &NotificationEvent) -> Result<(), PublishError> {
        if self.fail {
            return Err(PublishError::Transport("broker offline".to_string()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// 模拟竞争者：读取待发送通知后立即抢先认领
pub struct ContendedRepository<R> {
    inner: Arc<R>,
}

impl<R> ContendedRepository<R> {
    pub fn new(inner: Arc<R>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: NotificationRepository> NotificationRepository for ContendedRepository<R> {
    async fn save(&self, notification: &Notification) -> Result<Notification, RepositoryError> {
        self.inner.save(notification).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        self.inner.find_by_user_id(user_id, limit, offset).await
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<Notification>, RepositoryError> {
        let pending = self.inner.find_pending(limit).await?;
        for notification in &pending {
            self.inner.claim(notification.id).await?;
        }
        Ok(pending)
    }

    async fn claim(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.claim(id).await
    }

    async fn complete_claim(
        &self,
        id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.inner.complete_claim(id, sent_at).await
    }

    async fn release_stale_claims(&self, older_than: ChronoDuration) -> Result<u64, RepositoryError> {
        self.inner.release_stale_claims(older_than).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.delete_by_id(id).await
    }
}

/// 前 `failures` 次 `save` 调用失败的仓库，其余操作透传
pub struct FlakySaveRepository<R> {
    inner: Arc<R>,
    failures: u32,
    save_calls: AtomicU32,
}

impl<R> FlakySaveRepository<R> {
    pub fn new(inner: Arc<R>, failures: u32) -> Self {
        Self {
            inner,
            failures,
            save_calls: AtomicU32::new(0),
        }
    }

    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: NotificationRepository> NotificationRepository for FlakySaveRepository<R> {
    async fn save(&self, notification: &Notification) -> Result<Notification, RepositoryError> {
        let call = self.save_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(RepositoryError::Database(sea_orm::DbErr::Custom(
                "connection reset".to_string(),
            )));
        }
        self.inner.save(notification).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        self.inner.find_by_user_id(user_id, limit, offset).await
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<Notification>, RepositoryError> {
        self.inner.find_pending(limit).await
    }

    async fn claim(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.claim(id).await
    }

    async fn complete_claim(
        &self,
        id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        self.inner.complete_claim(id, sent_at).await
    }

    async fn release_stale_claims(&self, older_than: ChronoDuration) -> Result<u64, RepositoryError> {
        self.inner.release_stale_claims(older_than).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.delete_by_id(id).await
    }
}
