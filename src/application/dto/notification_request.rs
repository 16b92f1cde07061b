// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::NewNotification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// 创建通知请求数据传输对象
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateNotificationRequest {
    /// 接收用户ID
    #[validate(length(min = 1, max = 128, message = "user_id must be 1-128 characters"))]
    pub user_id: String,
    /// 渠道：email、sms、push
    pub notification_type: String,
    /// 标题
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    /// 正文
    #[validate(length(min = 1, message = "content cannot be empty"))]
    pub content: String,
    /// 附加元数据（收件地址等）
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// 计划发送时间
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl From<CreateNotificationRequest> for NewNotification {
    fn from(request: CreateNotificationRequest) -> Self {
        Self {
            user_id: request.user_id,
            notification_type: request.notification_type,
            title: request.title,
            content: request.content,
            metadata: request.metadata,
            scheduled_at: request.scheduled_at,
        }
    }
}

/// 用户通知列表查询
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ListNotificationsRequest {
    #[validate(length(min = 1, message = "user_id cannot be empty"))]
    pub user_id: String,
    /// 每页条数
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u64,
    /// 偏移量
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    20
}
