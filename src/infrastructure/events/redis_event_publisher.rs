// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification_event::NotificationEvent;
use crate::domain::services::event_publisher::{EventPublisher, PublishError};
use crate::infrastructure::cache::redis_client::RedisClient;
use async_trait::async_trait;
use tracing::debug;

/// Redis事件发布器
///
/// 将事件序列化为 JSON 后 PUBLISH 到配置的频道
pub struct RedisEventPublisher {
    redis: RedisClient,
    channel: String,
}

impl RedisEventPublisher {
    pub fn new(redis: RedisClient, channel: impl Into<String>) -> Self {
        Self {
            redis,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &NotificationEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        let receivers = self
            .redis
            .publish(&self.channel, &payload)
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            channel = %self.channel,
            receivers,
            "Published notification event"
        );
        Ok(())
    }
}
