// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::notification_sender::SenderError;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// 投递提供方的 HTTP 客户端
///
/// 负责发送请求并把响应归类为领域层的发送错误：
/// 超时为 `Timeout`，连接失败、429 和 5xx 为 `Unavailable`，其余失败为 `Delivery`
#[derive(Clone)]
pub struct HttpProviderClient {
    client: Client,
}

impl HttpProviderClient {
    /// 创建新的提供方客户端
    ///
    /// # 参数
    ///
    /// * `request_timeout` - 单个请求的超时时间
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Learnhub-Notifier/0.1.0"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// 以 JSON 形式提交请求
    ///
    /// # 参数
    ///
    /// * `endpoint` - 提供方接口地址
    /// * `api_key` - 可选的 Bearer 令牌
    /// * `body` - 请求体
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        api_key: Option<&str>,
        body: &T,
    ) -> Result<(), SenderError> {
        let mut request = self.client.post(endpoint).json(body);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_request_error)?;
        let status = response.status();
        debug!(%endpoint, status = status.as_u16(), "Provider responded");

        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(classify_status(status, &detail))
    }
}

fn classify_request_error(err: reqwest::Error) -> SenderError {
    if err.is_timeout() {
        SenderError::Timeout(err.to_string())
    } else if err.is_connect() {
        SenderError::Unavailable(err.to_string())
    } else {
        SenderError::Delivery(err.to_string())
    }
}

fn classify_status(status: StatusCode, detail: &str) -> SenderError {
    let message = if detail.is_empty() {
        format!("provider returned {}", status)
    } else {
        format!("provider returned {}: {}", status, truncate(detail, 200))
    };

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        SenderError::Unavailable(message)
    } else {
        SenderError::Delivery(message)
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
