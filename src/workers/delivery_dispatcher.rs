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

use crate::config::settings::DispatcherSettings;
use crate::domain::models::notification::{Notification, NotificationError, NotificationStatus};
use crate::domain::models::notification_event::NotificationEventType;
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::domain::services::event_factory::NotificationEventFactory;
use crate::domain::services::event_publisher::EventPublisher;
use crate::domain::services::notification_sender::{NotificationSender, SenderError};
use crate::infrastructure::metrics::{DISPATCH_TOTAL, SEND_DURATION_SECONDS};
use crate::utils::errors::RepositoryError;
use crate::utils::retry_policy::RetryPolicy;
use chrono::Utc;
use metrics::{counter, histogram};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 分发器配置
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// 批量大小为 0 时使用的默认值
    pub default_batch_size: u64,
    /// 批量大小上限
    pub max_batch_size: u64,
    /// 单次发送超时
    pub send_timeout: Duration,
    /// 状态写回失败时的重试策略
    pub persist_retry: RetryPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 50,
            max_batch_size: 500,
            send_timeout: Duration::from_secs(10),
            persist_retry: persist_retry_policy(3),
        }
    }
}

fn persist_retry_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_secs(2),
        ..RetryPolicy::default()
    }
}

impl From<&DispatcherSettings> for DispatcherConfig {
    fn from(settings: &DispatcherSettings) -> Self {
        Self {
            default_batch_size: settings.default_batch_size,
            max_batch_size: settings.max_batch_size,
            send_timeout: settings.send_timeout(),
            persist_retry: persist_retry_policy(settings.persist_retries),
        }
    }
}

/// 单条通知的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已发送
    Sent,
    /// 永久失败或超时
    Failed,
    /// 暂时性故障，已退回 Pending
    Deferred,
    /// 未认领到或不满足发送条件
    Skipped,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent => "sent",
            DispatchOutcome::Failed => "failed",
            DispatchOutcome::Deferred => "deferred",
            DispatchOutcome::Skipped => "skipped",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一批分发的统计结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub fetched: usize,
    pub sent: usize,
    pub failed: usize,
    pub deferred: usize,
    pub skipped: usize,
    /// 本批遇到的第一个错误，仅用于诊断
    pub first_error: Option<String>,
}

impl DispatchReport {
    fn record(&mut self, outcome: DispatchOutcome, error: Option<String>) {
        match outcome {
            DispatchOutcome::Sent => self.sent += 1,
            DispatchOutcome::Failed => self.failed += 1,
            DispatchOutcome::Deferred => self.deferred += 1,
            DispatchOutcome::Skipped => self.skipped += 1,
        }
        if self.first_error.is_none() {
            self.first_error = error;
        }
    }

    /// 已处理条数
    pub fn processed(&self) -> usize {
        self.sent + self.failed + self.deferred + self.skipped
    }
}

/// 分发器的系统性错误
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 无法读取待发送通知
    #[error("Failed to load notifications: {0}")]
    Repository(#[from] RepositoryError),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        "DISPATCH_FAILED"
    }

    pub fn http_status(&self) -> u16 {
        500
    }
}

/// 投递分发器
///
/// 认领到期的 Pending 通知，调用渠道发送器，回写状态并发布生命周期事件。
/// 单条通知的失败只计入报告，不会中断整批处理。
pub struct DeliveryDispatcher {
    repository: Arc<dyn NotificationRepository>,
    sender: Arc<dyn NotificationSender>,
    publisher: Arc<dyn EventPublisher>,
    config: DispatcherConfig,
}

impl DeliveryDispatcher {
    /// 创建新的分发器实例
    ///
    /// # 参数
    ///
    /// * `repository` - 通知仓库
    /// * `sender` - 渠道发送器
    /// * `publisher` - 事件发布器
    /// * `config` - 分发器配置
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        sender: Arc<dyn NotificationSender>,
        publisher: Arc<dyn EventPublisher>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            repository,
            sender,
            publisher,
            config,
        }
    }

    /// 将请求的批量大小限制在配置范围内，0 表示使用默认值
    pub fn effective_batch_size(&self, requested: u64) -> u64 {
        let size = if requested == 0 {
            self.config.default_batch_size
        } else {
            requested
        };
        size.clamp(1, self.config.max_batch_size.max(1))
    }

    /// 处理一批到期的待发送通知
    ///
    /// 按创建时间顺序逐条处理。
    ///
    /// # 参数
    ///
    /// * `batch_size` - 本批最多处理的条数
    ///
    /// # 返回值
    ///
    /// * `Ok(DispatchReport)` - 本批统计
    /// * `Err(DispatchError)` - 读取待发送通知失败
    pub async fn process_pending(&self, batch_size: u64) -> Result<DispatchReport, DispatchError> {
        let limit = self.effective_batch_size(batch_size);
        let pending = self.repository.find_pending(limit).await?;

        let mut report = DispatchReport {
            fetched: pending.len(),
            ..Default::default()
        };

        if pending.is_empty() {
            return Ok(report);
        }

        debug!(count = pending.len(), limit, "Processing pending notifications");

        for notification in pending {
            let (outcome, error) = self.deliver(notification).await;
            report.record(outcome, error);
        }

        info!(
            fetched = report.fetched,
            sent = report.sent,
            failed = report.failed,
            deferred = report.deferred,
            skipped = report.skipped,
            "Dispatch batch finished"
        );

        Ok(report)
    }

    /// 投递单条通知
    ///
    /// 通知不存在、不处于 Pending 或尚未到期时跳过。
    pub async fn dispatch_one(&self, id: Uuid) -> Result<DispatchOutcome, DispatchError> {
        let notification = match self.repository.find_by_id(id).await? {
            Some(n) => n,
            None => {
                debug!(notification_id = %id, "Queued notification no longer exists");
                return Ok(self.count(DispatchOutcome::Skipped));
            }
        };

        if notification.status != NotificationStatus::Pending || !notification.is_due(Utc::now())
        {
            debug!(
                notification_id = %id,
                status = %notification.status,
                "Queued notification is not deliverable now"
            );
            return Ok(self.count(DispatchOutcome::Skipped));
        }

        let (outcome, _) = self.deliver(notification).await;
        Ok(outcome)
    }

    async fn deliver(&self, mut notification: Notification) -> (DispatchOutcome, Option<String>) {
        let id = notification.id;

        match self.repository.claim(id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(notification_id = %id, "Claim lost to another dispatcher");
                return (self.count(DispatchOutcome::Skipped), None);
            }
            Err(e) => {
                warn!(notification_id = %id, error = %e, "Failed to claim notification");
                return (self.count(DispatchOutcome::Deferred), Some(e.to_string()));
            }
        }

        if let Err(e) = notification.claim() {
            // persisted claim succeeded, so the snapshot was stale
            warn!(notification_id = %id, error = %e, "Claimed notification had unexpected status");
            notification.status = NotificationStatus::Processing;
        }

        let started = Instant::now();
        let send = self.sender.send(&notification);
        let result = match tokio::time::timeout(self.config.send_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(SenderError::Timeout(format!(
                "send timed out after {}ms",
                self.config.send_timeout.as_millis()
            ))),
        };
        histogram!(SEND_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        let (outcome, error) = match result {
            Ok(()) => self.complete_sent(&mut notification).await,
            Err(SenderError::Unavailable(reason)) => {
                warn!(notification_id = %id, %reason, "Provider unavailable, deferring");
                (
                    DispatchOutcome::Deferred,
                    self.reconcile(&mut notification, |n| n.release())
                        .await
                        .or(Some(reason)),
                )
            }
            Err(SenderError::Delivery(reason)) | Err(SenderError::Timeout(reason)) => {
                warn!(notification_id = %id, %reason, "Notification delivery failed");
                let persist_error = self
                    .reconcile(&mut notification, |n| n.mark_failed(reason.clone()))
                    .await;
                (DispatchOutcome::Failed, Some(persist_error.unwrap_or(reason)))
            }
        };

        (self.count(outcome), error)
    }

    async fn complete_sent(
        &self,
        notification: &mut Notification,
    ) -> (DispatchOutcome, Option<String>) {
        let sent_at = Utc::now();
        let mut error = self
            .reconcile(notification, |n| n.mark_sent(sent_at))
            .await;

        if error.is_some() && notification.status == NotificationStatus::Sent {
            // a claim left in PROCESSING would be released and sent again
            match self.repository.complete_claim(notification.id, sent_at).await {
                Ok(true) => {
                    info!(notification_id = %notification.id, "Sent status written through claim");
                    error = None;
                }
                Ok(false) => {
                    warn!(notification_id = %notification.id, "Claim no longer held after send");
                }
                Err(e) => {
                    error!(
                        notification_id = %notification.id,
                        error = %e,
                        "Failed to complete claim after send"
                    );
                }
            }
        }

        let event =
            NotificationEventFactory::create_event(NotificationEventType::Sent, notification);
        if let Err(e) = self.publisher.publish(&event).await {
            // the status stays SENT
            warn!(notification_id = %notification.id, error = %e, "Failed to publish sent event");
            error.get_or_insert_with(|| e.to_string());
        }

        info!(
            notification_id = %notification.id,
            channel = %notification.notification_type,
            "Notification sent"
        );
        (DispatchOutcome::Sent, error)
    }

    /// 应用状态转换并持久化，写入失败按重试策略重试，返回最终遇到的错误
    async fn reconcile<F>(&self, notification: &mut Notification, transition: F) -> Option<String>
    where
        F: FnOnce(&mut Notification) -> Result<(), NotificationError>,
    {
        if let Err(e) = transition(notification) {
            error!(notification_id = %notification.id, error = %e, "Invalid status transition");
            return Some(e.to_string());
        }

        let policy = &self.config.persist_retry;
        let mut attempt = 0u32;
        loop {
            match self.repository.save(notification).await {
                Ok(_) => return None,
                Err(e) if policy.should_retry(attempt) => {
                    attempt += 1;
                    let delay = policy.calculate_backoff(attempt);
                    warn!(
                        notification_id = %notification.id,
                        status = %notification.status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Failed to persist notification status, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        notification_id = %notification.id,
                        status = %notification.status,
                        error = %e,
                        "Failed to persist notification status"
                    );
                    return Some(e.to_string());
                }
            }
        }
    }

    fn count(&self, outcome: DispatchOutcome) -> DispatchOutcome {
        counter!(DISPATCH_TOTAL, "outcome" => outcome.as_str()).increment(1);
        outcome
    }
}
