// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，提供对具体技术的抽象和封装。
/// 基础设施层负责与外部系统的交互，包括数据库、Redis、投递提供方等。
///
/// 包含的子模块：
/// - 缓存（cache）：Redis客户端
/// - 数据库（database）：数据库连接和实体映射
/// - 事件（events）：通知生命周期事件的发布实现
/// - 指标（metrics）：Prometheus 导出器和指标名
/// - 仓库实现（repositories）：领域仓库接口的具体实现
/// - 发送器（senders）：邮件、短信、推送渠道的 HTTP 实现
///
/// 基础设施层遵循依赖倒置原则，依赖于领域层的抽象接口，
/// 确保领域层保持纯粹的业务逻辑，不受技术实现的影响。
pub mod cache;
pub mod database;
pub mod events;
pub mod metrics;
pub mod repositories;
pub mod senders;
