// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 事件发布模块
///
/// 通知生命周期事件的发布实现：Redis 频道与进程内广播
pub mod broadcast_event_publisher;
pub mod redis_event_publisher;
