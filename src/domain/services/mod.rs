// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含跨实体的业务规则与对外部能力的抽象：
/// 事件构造、发送与发布接口、学习进度和证书签发
pub mod certificate_service;
pub mod event_factory;
pub mod event_publisher;
pub mod notification_sender;
pub mod progress_service;
