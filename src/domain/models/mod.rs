// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 通知（notification）：单条通知及其投递状态机
/// - 通知事件（notification_event）：通知生命周期事件
/// - 选课（enrollment）：选课、课时完成记录与进度聚合
/// - 证书（certificate）：完成课程后签发的证书
pub mod certificate;
pub mod enrollment;
pub mod notification;
pub mod notification_event;
