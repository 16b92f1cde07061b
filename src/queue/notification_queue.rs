// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 传输层错误
    #[error("Queue transport error: {0}")]
    Transport(String),

    /// 队列中的消息无法解析
    #[error("Malformed queue message: {0}")]
    Malformed(String),

    /// 队列已关闭
    #[error("Queue closed")]
    Closed,
}

impl QueueError {
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::Transport(_) => "QUEUE_TRANSPORT_ERROR",
            QueueError::Malformed(_) => "QUEUE_MALFORMED_MESSAGE",
            QueueError::Closed => "QUEUE_CLOSED",
        }
    }

    pub fn http_status(&self) -> u16 {
        500
    }
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::Transport(err.to_string())
    }
}

/// 投递队列特质
///
/// 队列只传递通知ID，通知内容始终以仓库为准
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// 将通知ID加入投递队列
    async fn enqueue(&self, notification_id: Uuid) -> Result<(), QueueError>;

    /// 取出一个通知ID
    ///
    /// # 参数
    ///
    /// * `block_timeout` - 队列为空时的最长等待时间
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Uuid))` - 取出的通知ID
    /// * `Ok(None)` - 等待超时
    async fn dequeue(&self, block_timeout: Duration) -> Result<Option<Uuid>, QueueError>;
}

#[async_trait]
impl<T: NotificationQueue + ?Sized> NotificationQueue for Arc<T> {
    async fn enqueue(&self, notification_id: Uuid) -> Result<(), QueueError> {
        (**self).enqueue(notification_id).await
    }

    async fn dequeue(&self, block_timeout: Duration) -> Result<Option<Uuid>, QueueError> {
        (**self).dequeue(block_timeout).await
    }
}

/// 进程内投递队列
///
/// 基于 tokio mpsc 通道，用于单进程部署和测试
pub struct InMemoryNotificationQueue {
    sender: mpsc::UnboundedSender<Uuid>,
    receiver: Mutex<mpsc::UnboundedReceiver<Uuid>>,
}

impl InMemoryNotificationQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }
}

impl Default for InMemoryNotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationQueue for InMemoryNotificationQueue {
    async fn enqueue(&self, notification_id: Uuid) -> Result<(), QueueError> {
        self.sender
            .send(notification_id)
            .map_err(|_| QueueError::Closed)
    }

    async fn dequeue(&self, block_timeout: Duration) -> Result<Option<Uuid>, QueueError> {
        let mut receiver = self.receiver.lock().await;
        match tokio::time::timeout(block_timeout, receiver.recv()).await {
            Ok(Some(id)) => Ok(Some(id)),
            Ok(None) => Err(QueueError::Closed),
            Err(_) => Ok(None),
        }
    }
}
