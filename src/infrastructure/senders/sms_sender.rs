// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::http_provider::HttpProviderClient;
use crate::domain::models::notification::Notification;
use crate::domain::services::notification_sender::{NotificationSender, SenderError};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

pub const SMS_RECIPIENT_KEY: &str = "phone";

/// 短信发送器
///
/// 短信没有标题，标题与正文合并为一条文本
pub struct SmsSender {
    client: HttpProviderClient,
    endpoint: String,
    api_key: Option<String>,
}

impl SmsSender {
    pub fn new(client: HttpProviderClient, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl NotificationSender for SmsSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        let to = notification
            .metadata_value(SMS_RECIPIENT_KEY)
            .ok_or_else(|| {
                SenderError::Delivery(format!("missing recipient metadata '{}'", SMS_RECIPIENT_KEY))
            })?;

        let text = if notification.title.is_empty() {
            notification.content.clone()
        } else {
            format!("{}: {}", notification.title, notification.content)
        };

        let body = json!({
            "notification_id": notification.id,
            "to": to,
            "text": text,
        });

        self.client
            .post_json(&self.endpoint, self.api_key.as_deref(), &body)
            .await?;

        info!(notification_id = %notification.id, "SMS accepted by provider");
        Ok(())
    }
}
