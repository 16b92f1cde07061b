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

pub const PUSH_RECIPIENT_KEY: &str = "device_token";

/// 移动推送发送器
///
/// 除设备令牌外的元数据作为推送的自定义数据一并发送
pub struct PushSender {
    client: HttpProviderClient,
    endpoint: String,
    api_key: Option<String>,
}

impl PushSender {
    pub fn new(client: HttpProviderClient, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl NotificationSender for PushSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        let device_token = notification
            .metadata_value(PUSH_RECIPIENT_KEY)
            .ok_or_else(|| {
                SenderError::Delivery(format!(
                    "missing recipient metadata '{}'",
                    PUSH_RECIPIENT_KEY
                ))
            })?;

        let data: serde_json::Map<String, serde_json::Value> = notification
            .metadata
            .iter()
            .filter(|(k, _)| k.as_str() != PUSH_RECIPIENT_KEY)
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        let body = json!({
            "notification_id": notification.id,
            "device_token": device_token,
            "title": notification.title,
            "body": notification.content,
            "data": data,
        });

        self.client
            .post_json(&self.endpoint, self.api_key.as_deref(), &body)
            .await?;

        info!(notification_id = %notification.id, "Push accepted by provider");
        Ok(())
    }
}
