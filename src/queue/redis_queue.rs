// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::cache::redis_client::RedisClient;
use crate::queue::notification_queue::{NotificationQueue, QueueError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Redis投递队列
///
/// LPUSH 入队，RPOP 出队。出队在阻塞时间内按固定间隔轮询，
/// 多路复用连接上不使用 BRPOP，避免长阻塞命令触发响应超时。
pub struct RedisNotificationQueue {
    redis: RedisClient,
    key: String,
    poll_interval: Duration,
}

impl RedisNotificationQueue {
    /// 创建新的Redis投递队列
    ///
    /// # 参数
    ///
    /// * `redis` - Redis客户端
    /// * `key` - 队列所在的列表键
    /// * `poll_interval` - 队列为空时的轮询间隔
    pub fn new(redis: RedisClient, key: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            redis,
            key: key.into(),
            poll_interval,
        }
    }
}

#[async_trait]
impl NotificationQueue for RedisNotificationQueue {
    async fn enqueue(&self, notification_id: Uuid) -> Result<(), QueueError> {
        self.redis
            .lpush(&self.key, &notification_id.to_string())
            .await?;
        Ok(())
    }

    async fn dequeue(&self, block_timeout: Duration) -> Result<Option<Uuid>, QueueError> {
        let deadline = Instant::now() + block_timeout;

        loop {
            if let Some(raw) = self.redis.rpop(&self.key).await? {
                return match Uuid::parse_str(&raw) {
                    Ok(id) => Ok(Some(id)),
                    Err(e) => {
                        warn!(queue = %self.key, payload = %raw, "Dropping malformed queue message");
                        Err(QueueError::Malformed(e.to_string()))
                    }
                };
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
