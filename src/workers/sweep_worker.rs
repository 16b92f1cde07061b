// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::utils::errors::WorkerError;
use crate::workers::delivery_dispatcher::DeliveryDispatcher;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// 定时扫描工作器
///
/// 每个周期先释放失效的认领，再处理一批到期的待发送通知。
/// 覆盖计划发送的通知以及没有进入队列的通知。
pub struct DispatchSweepWorker {
    repository: Arc<dyn NotificationRepository>,
    dispatcher: Arc<DeliveryDispatcher>,
    poll_interval: Duration,
    claim_timeout: Duration,
    batch_size: u64,
}

impl DispatchSweepWorker {
    /// 创建新的扫描工作器
    ///
    /// # 参数
    ///
    /// * `poll_interval` - 扫描间隔
    /// * `claim_timeout` - Processing 状态的最长保留时间
    /// * `batch_size` - 每次扫描处理的条数，0 表示使用分发器默认值
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        dispatcher: Arc<DeliveryDispatcher>,
        poll_interval: Duration,
        claim_timeout: Duration,
        batch_size: u64,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            poll_interval,
            claim_timeout,
            batch_size,
        }
    }

    /// 执行一次扫描
    pub async fn sweep(&self) -> Result<(), WorkerError> {
        let claim_timeout = chrono::Duration::from_std(self.claim_timeout)
            .map_err(|e| WorkerError::InternalError(e.to_string()))?;

        match self.repository.release_stale_claims(claim_timeout).await {
            Ok(0) => {}
            Ok(released) => warn!(released, "Released stale notification claims"),
            Err(e) => error!(error = %e, "Failed to release stale claims"),
        }

        self.dispatcher
            .process_pending(self.batch_size)
            .await
            .map_err(|e| WorkerError::RepositoryError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Worker for DispatchSweepWorker {
    async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), WorkerError> {
        info!(
            worker = self.name(),
            interval_secs = self.poll_interval.as_secs_f64(),
            "Sweep worker started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!(worker = self.name(), error = %e, "Sweep failed");
                    }
                }
            }
        }

        info!(worker = self.name(), "Sweep worker stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "dispatch-sweep"
    }
}
