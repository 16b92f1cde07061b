// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::Notification;
use crate::domain::models::notification_event::{
    EventError, NotificationEvent, NotificationEventType,
};
use chrono::Utc;
use uuid::Uuid;

/// 通知事件工厂
pub struct NotificationEventFactory;

impl NotificationEventFactory {
    /// 创建事件
    ///
    /// 事件内嵌通知的独立副本，之后对原通知的修改不会影响已创建的事件。
    ///
    /// # 参数
    ///
    /// * `event_type` - 事件类型
    /// * `notification` - 事件对应的通知
    pub fn create_event(
        event_type: NotificationEventType,
        notification: &Notification,
    ) -> NotificationEvent {
        NotificationEvent {
            id: Uuid::new_v4(),
            event_type,
            notification: notification.clone(),
            occurred_at: Utc::now(),
        }
    }

    /// 根据事件标签创建事件
    ///
    /// # 返回值
    ///
    /// * `Ok(NotificationEvent)` - 创建的事件
    /// * `Err(EventError::UnsupportedEventType)` - 标签不是已知的四种之一
    pub fn create_event_from_tag(
        tag: &str,
        notification: &Notification,
    ) -> Result<NotificationEvent, EventError> {
        let event_type = tag.parse::<NotificationEventType>()?;
        Ok(Self::create_event(event_type, notification))
    }
}
