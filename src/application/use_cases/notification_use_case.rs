// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    application::dto::notification_request::{CreateNotificationRequest, ListNotificationsRequest},
    domain::{
        models::{
            notification::{Notification, NotificationError},
            notification_event::NotificationEventType,
        },
        repositories::notification_repository::NotificationRepository,
        services::{event_factory::NotificationEventFactory, event_publisher::EventPublisher},
    },
    queue::notification_queue::NotificationQueue,
    utils::errors::RepositoryError,
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Error, Debug)]
pub enum NotificationServiceError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Notification {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Domain(#[from] NotificationError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl NotificationServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            NotificationServiceError::ValidationError(_) => "VALIDATION_ERROR",
            NotificationServiceError::NotFound(_) => "NOT_FOUND",
            NotificationServiceError::Domain(e) => e.code(),
            NotificationServiceError::Repository(e) => e.code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            NotificationServiceError::ValidationError(_) => 400,
            NotificationServiceError::NotFound(_) => 404,
            NotificationServiceError::Domain(e) => e.http_status(),
            NotificationServiceError::Repository(e) => e.http_status(),
        }
    }
}

/// 通知用例
///
/// 面向外部调用方的薄应用服务：创建、查询、取消和清除通知
pub struct NotificationUseCase {
    repository: Arc<dyn NotificationRepository>,
    publisher: Arc<dyn EventPublisher>,
    queue: Arc<dyn NotificationQueue>,
}

impl NotificationUseCase {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        publisher: Arc<dyn EventPublisher>,
        queue: Arc<dyn NotificationQueue>,
    ) -> Self {
        Self {
            repository,
            publisher,
            queue,
        }
    }

    /// 创建通知
    ///
    /// 持久化后发布 CREATED 事件并加入投递队列；
    /// 计划在未来发送的通知发布 SCHEDULED 事件，由定时扫描在到期后投递。
    /// 事件发布或入队失败只记录日志。
    pub async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<Notification, NotificationServiceError> {
        request
            .validate()
            .map_err(|e| NotificationServiceError::ValidationError(e.to_string()))?;

        let notification = Notification::create(request.into())?;
        self.repository.save(&notification).await?;

        let scheduled = notification.is_scheduled_after(Utc::now());
        let event_type = if scheduled {
            NotificationEventType::Scheduled
        } else {
            NotificationEventType::Created
        };
        self.publish(event_type, &notification).await;

        if !scheduled {
            if let Err(e) = self.queue.enqueue(notification.id).await {
                warn!(
                    notification_id = %notification.id,
                    error = %e,
                    "Failed to enqueue notification, the sweep will pick it up"
                );
            }
        }

        info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            channel = %notification.notification_type,
            scheduled,
            "Notification created"
        );
        Ok(notification)
    }

    pub async fn get_notification(
        &self,
        id: Uuid,
    ) -> Result<Notification, NotificationServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(NotificationServiceError::NotFound(id))
    }

    pub async fn list_for_user(
        &self,
        request: ListNotificationsRequest,
    ) -> Result<Vec<Notification>, NotificationServiceError> {
        request
            .validate()
            .map_err(|e| NotificationServiceError::ValidationError(e.to_string()))?;

        Ok(self
            .repository
            .find_by_user_id(&request.user_id, request.limit, request.offset)
            .await?)
    }

    /// 取消通知
    ///
    /// 只有 Pending 通知可以取消。与正在进行的发送并发时以最后写入为准。
    pub async fn cancel_notification(
        &self,
        id: Uuid,
    ) -> Result<Notification, NotificationServiceError> {
        let mut notification = self.get_notification(id).await?;
        notification.cancel()?;
        self.repository.save(&notification).await?;

        self.publish(NotificationEventType::Cancelled, &notification)
            .await;
        info!(notification_id = %id, "Notification cancelled");
        Ok(notification)
    }

    /// 删除通知，管理操作
    pub async fn purge_notification(&self, id: Uuid) -> Result<(), NotificationServiceError> {
        if !self.repository.delete_by_id(id).await? {
            return Err(NotificationServiceError::NotFound(id));
        }
        info!(notification_id = %id, "Notification purged");
        Ok(())
    }

    async fn publish(&self, event_type: NotificationEventType, notification: &Notification) {
        let event = NotificationEventFactory::create_event(event_type, notification);
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(
                notification_id = %notification.id,
                event_type = %event_type,
                error = %e,
                "Failed to publish notification event"
            );
        }
    }
}
