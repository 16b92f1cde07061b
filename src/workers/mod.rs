// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 后台工作器模块
///
/// 投递分发器、队列消费者、定时扫描以及监督它们的工作管理器
pub mod delivery_dispatcher;
pub mod manager;
pub mod queue_consumer;
pub mod sweep_worker;
pub mod worker;
