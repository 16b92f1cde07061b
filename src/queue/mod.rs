// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供通知投递队列，负责把待发送通知的ID交给队列消费者
pub mod notification_queue;
pub mod redis_queue;
