// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 通知生命周期事件
///
/// 描述通知状态变化的不可变事实，内嵌发生时刻的通知快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// 事件唯一标识符
    pub id: Uuid,
    /// 事件类型
    pub event_type: NotificationEventType,
    /// 事件发生时的通知快照
    pub notification: Notification,
    /// 事件发生时间
    pub occurred_at: DateTime<Utc>,
}

/// 通知事件类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationEventType {
    #[serde(rename = "notification.created")]
    Created,
    #[serde(rename = "notification.scheduled")]
    Scheduled,
    #[serde(rename = "notification.sent")]
    Sent,
    #[serde(rename = "notification.cancelled")]
    Cancelled,
}

impl fmt::Display for NotificationEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationEventType::Created => write!(f, "notification.created"),
            NotificationEventType::Scheduled => write!(f, "notification.scheduled"),
            NotificationEventType::Sent => write!(f, "notification.sent"),
            NotificationEventType::Cancelled => write!(f, "notification.cancelled"),
        }
    }
}

impl FromStr for NotificationEventType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notification.created" => Ok(NotificationEventType::Created),
            "notification.scheduled" => Ok(NotificationEventType::Scheduled),
            "notification.sent" => Ok(NotificationEventType::Sent),
            "notification.cancelled" => Ok(NotificationEventType::Cancelled),
            other => Err(EventError::UnsupportedEventType(other.to_string())),
        }
    }
}

/// 事件构造错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// 不支持的事件类型标签
    #[error("Unsupported event type: {0}")]
    UnsupportedEventType(String),
}

impl EventError {
    pub fn code(&self) -> &'static str {
        "UNSUPPORTED_EVENT_TYPE"
    }

    pub fn http_status(&self) -> u16 {
        400
    }
}
