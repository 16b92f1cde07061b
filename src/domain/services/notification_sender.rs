// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::Notification;
use async_trait::async_trait;
use thiserror::Error;

/// 发送错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SenderError {
    /// 永久性投递失败（收件人无效、提供方拒绝等），不会自动重试
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// 发送超时
    #[error("Send timed out: {0}")]
    Timeout(String),

    /// 提供方暂时不可用，通知会被退回 Pending
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl SenderError {
    pub fn code(&self) -> &'static str {
        match self {
            SenderError::Delivery(_) => "DELIVERY_FAILED",
            SenderError::Timeout(_) => "SEND_TIMEOUT",
            SenderError::Unavailable(_) => "PROVIDER_UNAVAILABLE",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            SenderError::Delivery(_) => 500,
            SenderError::Timeout(_) => 504,
            SenderError::Unavailable(_) => 503,
        }
    }
}

/// 渠道发送器特质
///
/// 每个实现负责一种投递渠道（邮件、短信、推送）
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 发送一条通知
    ///
    /// # 参数
    ///
    /// * `notification` - 待发送的通知
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 提供方已接受
    /// * `Err(SenderError)` - 发送失败
    async fn send(&self, notification: &Notification) -> Result<(), SenderError>;
}
