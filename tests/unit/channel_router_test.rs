// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::fakes::ScriptedSender;
use crate::integration::helpers::pending_notification;
use learnhub::domain::models::notification::NotificationType;
use learnhub::domain::services::notification_sender::{NotificationSender, SenderError};
use learnhub::infrastructure::senders::channel_router::ChannelSenderRouter;
use std::sync::Arc;

#[tokio::test]
async fn test_router_dispatches_by_channel() {
    let email = Arc::new(ScriptedSender::new());
    let sms = Arc::new(ScriptedSender::new());
    let router = ChannelSenderRouter::new()
        .register(NotificationType::Email, email.clone())
        .register(NotificationType::Sms, sms.clone());

    let n = pending_notification("user-1", "sms", 1);
    router.send(&n).await.unwrap();

    assert!(email.sent().is_empty());
    assert_eq!(sms.sent(), vec![n.id]);
    assert!(router.supports(NotificationType::Email));
    assert!(!router.supports(NotificationType::Push));
}

#[tokio::test]
async fn test_unconfigured_channel_fails_permanently() {
    let router = ChannelSenderRouter::new().register(
        NotificationType::Email,
        Arc::new(ScriptedSender::new()),
    );

    let err = router
        .send(&pending_notification("user-1", "push", 1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SenderError::Delivery("no sender configured for channel push".to_string())
    );
}

#[tokio::test]
async fn test_router_propagates_sender_errors() {
    let push = Arc::new(ScriptedSender::new());
    let n = pending_notification("user-1", "push", 1);
    push.fail(n.id, SenderError::Timeout("gateway slow".to_string()));
    let router = ChannelSenderRouter::new().register(NotificationType::Push, push);

    assert!(matches!(
        router.send(&n).await,
        Err(SenderError::Timeout(_))
    ));
}
