// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification_event::NotificationEvent;
use crate::domain::services::event_publisher::{EventPublisher, PublishError};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

/// 进程内事件发布器
///
/// 基于 tokio broadcast 通道，订阅者通过 `subscribe` 获取接收端。
/// 没有订阅者时事件被丢弃，发布仍然成功。
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<NotificationEvent>,
}

impl BroadcastEventPublisher {
    /// 创建新的广播发布器
    ///
    /// # 参数
    ///
    /// * `capacity` - 通道缓冲容量，慢订阅者会丢失最早的事件
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: &NotificationEvent) -> Result<(), PublishError> {
        if self.sender.send(event.clone()).is_err() {
            debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                "No subscribers, event dropped"
            );
        }
        Ok(())
    }
}
