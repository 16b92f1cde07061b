// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::notification_queue::NotificationQueue;
use crate::utils::errors::WorkerError;
use crate::workers::delivery_dispatcher::DeliveryDispatcher;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// 连续出队失败达到该次数后退出，交由管理器重启
const MAX_CONSECUTIVE_QUEUE_ERRORS: u32 = 10;

/// 队列消费者
///
/// 从投递队列取出通知ID并交给分发器投递
pub struct QueueConsumerWorker {
    queue: Arc<dyn NotificationQueue>,
    dispatcher: Arc<DeliveryDispatcher>,
    block_timeout: Duration,
    error_backoff: Duration,
}

impl QueueConsumerWorker {
    /// 创建新的队列消费者
    ///
    /// # 参数
    ///
    /// * `queue` - 投递队列
    /// * `dispatcher` - 投递分发器
    /// * `block_timeout` - 单次出队的最长等待时间
    pub fn new(
        queue: Arc<dyn NotificationQueue>,
        dispatcher: Arc<DeliveryDispatcher>,
        block_timeout: Duration,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            block_timeout,
            error_backoff: Duration::from_secs(1),
        }
    }

    /// 设置出队失败后的等待时间
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }
}

#[async_trait]
impl Worker for QueueConsumerWorker {
    async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        info!(worker = self.name(), "Queue consumer started");
        let mut consecutive_errors = 0u32;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                next = self.queue.dequeue(self.block_timeout) => next,
            };

            match next {
                Ok(Some(id)) => {
                    consecutive_errors = 0;
                    // runs outside the select so shutdown never interrupts a send
                    match self.dispatcher.dispatch_one(id).await {
                        Ok(outcome) => {
                            debug!(notification_id = %id, %outcome, "Queued notification processed")
                        }
                        Err(e) => {
                            error!(notification_id = %id, error = %e, "Failed to dispatch queued notification")
                        }
                    }
                }
                Ok(None) => {
                    consecutive_errors = 0;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(error = %e, consecutive_errors, "Failed to dequeue notification");
                    if consecutive_errors >= MAX_CONSECUTIVE_QUEUE_ERRORS {
                        return Err(WorkerError::QueueError(e.to_string()));
                    }
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = tokio::time::sleep(self.error_backoff) => {}
                    }
                }
            }
        }

        info!(worker = self.name(), "Queue consumer stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "queue-consumer"
    }
}
