// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::{Notification, NotificationType};
use crate::domain::services::notification_sender::{NotificationSender, SenderError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// 按渠道路由的发送器
///
/// 分发器只依赖这一个发送器，由它选择具体渠道
#[derive(Default, Clone)]
pub struct ChannelSenderRouter {
    senders: HashMap<NotificationType, Arc<dyn NotificationSender>>,
}

impl ChannelSenderRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册渠道发送器，同一渠道重复注册时覆盖旧的发送器
    pub fn register(
        mut self,
        channel: NotificationType,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        self.senders.insert(channel, sender);
        self
    }

    pub fn supports(&self, channel: NotificationType) -> bool {
        self.senders.contains_key(&channel)
    }
}

#[async_trait]
impl NotificationSender for ChannelSenderRouter {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        match self.senders.get(&notification.notification_type) {
            Some(sender) => sender.send(notification).await,
            None => Err(SenderError::Delivery(format!(
                "no sender configured for channel {}",
                notification.notification_type
            ))),
        }
    }
}
