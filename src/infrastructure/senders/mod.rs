// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 渠道发送器模块
///
/// 通过提供方的 HTTP 接口投递邮件、短信和推送，
/// 并按通知渠道路由到对应的发送器
pub mod channel_router;
pub mod email_sender;
pub mod http_provider;
pub mod push_sender;
pub mod sms_sender;
