// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::pending_notification;
use learnhub::domain::services::notification_sender::{NotificationSender, SenderError};
use learnhub::infrastructure::senders::email_sender::EmailSender;
use learnhub::infrastructure::senders::http_provider::HttpProviderClient;
use learnhub::infrastructure::senders::push_sender::PushSender;
use learnhub::infrastructure::senders::sms_sender::SmsSender;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> HttpProviderClient {
    HttpProviderClient::new(Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_email_sender_posts_to_provider() {
    let server = MockServer::start().await;
    let n = pending_notification("user-1", "email", 1);
    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header("authorization", "Bearer mail-key"))
        .and(body_partial_json(json!({
            "to": "learner@example.com",
            "subject": "Course update",
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let sender = EmailSender::new(
        client(),
        format!("{}/email", server.uri()),
        Some("mail-key".to_string()),
    );

    sender.send(&n).await.unwrap();
}

#[tokio::test]
async fn test_server_errors_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    let sender = SmsSender::new(client(), format!("{}/sms", server.uri()), None);

    let err = sender
        .send(&pending_notification("user-1", "sms", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, SenderError::Unavailable(_)));
}

#[tokio::test]
async fn test_rate_limit_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    let sender = PushSender::new(client(), format!("{}/push", server.uri()), None);

    let err = sender
        .send(&pending_notification("user-1", "push", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, SenderError::Unavailable(_)));
}

#[tokio::test]
async fn test_client_errors_are_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push"))
        .and(body_partial_json(json!({ "device_token": "device-abc" })))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad token"))
        .mount(&server)
        .await;
    let sender = PushSender::new(client(), format!("{}/push", server.uri()), None);

    let err = sender
        .send(&pending_notification("user-1", "push", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, SenderError::Delivery(_)));
}

#[tokio::test]
async fn test_missing_recipient_never_reaches_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let sender = SmsSender::new(client(), format!("{}/sms", server.uri()), None);
    let mut n = pending_notification("user-1", "sms", 1);
    n.metadata.remove("phone");

    let err = sender.send(&n).await.unwrap_err();

    match err {
        SenderError::Delivery(reason) => assert!(reason.contains("phone")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_unavailable() {
    // nothing listens on the discard port
    let sender = EmailSender::new(client(), "http://127.0.0.1:9/email".to_string(), None);

    let err = sender
        .send(&pending_notification("user-1", "email", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, SenderError::Unavailable(_)));
}
