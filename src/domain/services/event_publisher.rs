// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification_event::NotificationEvent;
use async_trait::async_trait;
use thiserror::Error;

/// 事件发布错误
#[derive(Error, Debug)]
pub enum PublishError {
    /// 事件序列化失败
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 传输层错误
    #[error("Event transport error: {0}")]
    Transport(String),
}

impl PublishError {
    pub fn code(&self) -> &'static str {
        match self {
            PublishError::Serialization(_) => "EVENT_SERIALIZATION_ERROR",
            PublishError::Transport(_) => "EVENT_TRANSPORT_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        500
    }
}

/// 事件发布器特质
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 发布一条通知生命周期事件
    async fn publish(&self, event: &NotificationEvent) -> Result<(), PublishError>;
}
