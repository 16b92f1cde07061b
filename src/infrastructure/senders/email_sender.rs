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

/// 收件地址所在的元数据键
pub const EMAIL_RECIPIENT_KEY: &str = "email";

/// 邮件发送器
pub struct EmailSender {
    client: HttpProviderClient,
    endpoint: String,
    api_key: Option<String>,
}

impl EmailSender {
    pub fn new(client: HttpProviderClient, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        let to = notification
            .metadata_value(EMAIL_RECIPIENT_KEY)
            .ok_or_else(|| {
                SenderError::Delivery(format!(
                    "missing recipient metadata '{}'",
                    EMAIL_RECIPIENT_KEY
                ))
            })?;

        let body = json!({
            "notification_id": notification.id,
            "to": to,
            "subject": notification.title,
            "body": notification.content,
        });

        self.client
            .post_json(&self.endpoint, self.api_key.as_deref(), &body)
            .await?;

        info!(notification_id = %notification.id, "Email accepted by provider");
        Ok(())
    }
}
