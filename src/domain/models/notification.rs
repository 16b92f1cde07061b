// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// 通知实体
///
/// 表示发送给单个用户的一条消息（邮件、短信或推送），
/// 带有完整的投递生命周期。状态只能从 Pending 单向流转到终态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// 通知唯一标识符
    pub id: Uuid,
    /// 接收用户ID
    pub user_id: String,
    /// 投递渠道
    pub notification_type: NotificationType,
    /// 标题
    pub title: String,
    /// 正文
    pub content: String,
    /// 附加元数据，渠道发送器从中读取收件地址
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// 当前状态
    pub status: NotificationStatus,
    /// 失败原因，仅在 Failed 状态下存在
    pub failure_reason: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
    /// 发送成功时间，当且仅当状态为 Sent 时存在
    pub sent_at: Option<DateTime<Utc>>,
    /// 计划发送时间，为空表示立即发送
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// 创建通知的输入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewNotification {
    pub user_id: String,
    /// 渠道名称：email、sms、push
    pub notification_type: String,
    #[validate(length(min = 1, message = "title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "content cannot be empty"))]
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewNotification {
    pub fn new(
        user_id: impl Into<String>,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            notification_type: notification_type.into(),
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

/// 通知渠道枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// 电子邮件
    Email,
    /// 短信
    Sms,
    /// 移动推送
    Push,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotificationType::Email => write!(f, "email"),
            NotificationType::Sms => write!(f, "sms"),
            NotificationType::Push => write!(f, "push"),
        }
    }
}

impl FromStr for NotificationType {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(NotificationType::Email),
            "sms" => Ok(NotificationType::Sms),
            "push" => Ok(NotificationType::Push),
            other => Err(NotificationError::Validation(format!(
                "unsupported notification type '{}', expected one of email, sms, push",
                other
            ))),
        }
    }
}

/// 通知状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Processing → Sent/Failed
/// Pending → Sent/Failed/Cancelled
/// Processing → Pending（暂时性故障后释放认领）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// 待发送
    #[default]
    Pending,
    /// 已被某个分发器认领，正在发送
    Processing,
    /// 已发送
    Sent,
    /// 发送失败
    Failed,
    /// 已取消
    Cancelled,
}

impl NotificationStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NotificationStatus::Sent | NotificationStatus::Failed | NotificationStatus::Cancelled
        )
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotificationStatus::Pending => write!(f, "pending"),
            NotificationStatus::Processing => write!(f, "processing"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Failed => write!(f, "failed"),
            NotificationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "processing" => Ok(NotificationStatus::Processing),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            "cancelled" => Ok(NotificationStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// 通知领域错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// 输入不符合领域规则
    #[error("Validation error: {0}")]
    Validation(String),

    /// 非法的状态转换
    #[error("Invalid state transition: cannot {action} a {from} notification")]
    InvalidTransition {
        from: NotificationStatus,
        action: &'static str,
    },
}

impl NotificationError {
    /// 稳定的错误码
    pub fn code(&self) -> &'static str {
        match self {
            NotificationError::Validation(_) => "VALIDATION_ERROR",
            NotificationError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            NotificationError::Validation(_) => 400,
            NotificationError::InvalidTransition { .. } => 409,
        }
    }
}

impl Notification {
    /// 创建一条新的通知
    ///
    /// # 参数
    ///
    /// * `new` - 创建参数，渠道名称不区分大小写
    ///
    /// # 返回值
    ///
    /// * `Ok(Notification)` - 处于 Pending 状态的新通知
    /// * `Err(NotificationError::Validation)` - 用户ID为空、标题或正文为空、渠道不受支持
    pub fn create(new: NewNotification) -> Result<Self, NotificationError> {
        if new.user_id.trim().is_empty() {
            return Err(NotificationError::Validation(
                "user_id cannot be empty".to_string(),
            ));
        }
        new.validate()
            .map_err(|e| NotificationError::Validation(e.to_string()))?;
        let notification_type = new.notification_type.parse::<NotificationType>()?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            notification_type,
            title: new.title,
            content: new.content,
            metadata: new.metadata,
            status: NotificationStatus::Pending,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            sent_at: None,
            scheduled_at: new.scheduled_at,
        })
    }

    /// 判断通知在给定时间是否到期可发送
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at.map_or(true, |at| at <= now)
    }

    /// 判断通知是否计划在给定时间之后发送
    pub fn is_scheduled_after(&self, now: DateTime<Utc>) -> bool {
        !self.is_due(now)
    }

    /// 认领通知，Pending → Processing
    pub fn claim(&mut self) -> Result<(), NotificationError> {
        self.transition(
            &[NotificationStatus::Pending],
            NotificationStatus::Processing,
            "claim",
        )
    }

    /// 释放认领，Processing → Pending
    pub fn release(&mut self) -> Result<(), NotificationError> {
        self.transition(
            &[NotificationStatus::Processing],
            NotificationStatus::Pending,
            "release",
        )
    }

    /// 标记为已发送
    ///
    /// # 参数
    ///
    /// * `sent_at` - 发送成功的时间
    pub fn mark_sent(&mut self, sent_at: DateTime<Utc>) -> Result<(), NotificationError> {
        self.transition(
            &[NotificationStatus::Pending, NotificationStatus::Processing],
            NotificationStatus::Sent,
            "mark sent",
        )?;
        self.sent_at = Some(sent_at);
        self.failure_reason = None;
        Ok(())
    }

    /// 标记为发送失败
    ///
    /// # 参数
    ///
    /// * `reason` - 失败原因
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), NotificationError> {
        self.transition(
            &[NotificationStatus::Pending, NotificationStatus::Processing],
            NotificationStatus::Failed,
            "mark failed",
        )?;
        self.failure_reason = Some(reason.into());
        self.sent_at = None;
        Ok(())
    }

    /// 取消通知，仅 Pending 状态可取消
    pub fn cancel(&mut self) -> Result<(), NotificationError> {
        self.transition(
            &[NotificationStatus::Pending],
            NotificationStatus::Cancelled,
            "cancel",
        )
    }

    fn transition(
        &mut self,
        allowed_from: &[NotificationStatus],
        to: NotificationStatus,
        action: &'static str,
    ) -> Result<(), NotificationError> {
        if !allowed_from.contains(&self.status) {
            return Err(NotificationError::InvalidTransition {
                from: self.status,
                action,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 读取元数据中的某个键
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
