// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 通知仓库（notification_repository）：通知的存取、认领与清理
/// - 选课仓库（enrollment_repository）：选课记录
/// - 课时进度仓库（lesson_progress_repository）：课时完成记录
/// - 证书仓库（certificate_repository）：证书记录
pub mod certificate_repository;
pub mod enrollment_repository;
pub mod lesson_progress_repository;
pub mod notification_repository;
