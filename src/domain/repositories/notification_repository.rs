// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::notification::Notification;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// 通知仓库特质
///
/// 定义通知数据访问接口
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// 保存通知（不存在则插入，存在则整体覆盖）
    async fn save(&self, notification: &Notification) -> Result<Notification, RepositoryError>;

    /// 根据ID查找通知
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError>;

    /// 分页查询用户的通知，按创建时间倒序
    async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// 获取到期的待发送通知
    ///
    /// 只返回 `scheduled_at` 为空或不晚于当前时间的 Pending 通知，
    /// 按创建时间升序排列，创建时间相同则按ID排序。
    async fn find_pending(&self, limit: u64) -> Result<Vec<Notification>, RepositoryError>;

    /// 原子认领通知
    ///
    /// 条件更新 Pending → Processing。
    ///
    /// # 返回值
    ///
    /// 认领成功返回 true；通知不存在或已不处于 Pending 时返回 false
    async fn claim(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// 将已认领的通知标记为已发送
    ///
    /// 条件更新 Processing → Sent，只写入状态和发送时间。
    ///
    /// # 返回值
    ///
    /// 通知仍处于 Processing 并被更新时返回 true
    async fn complete_claim(
        &self,
        id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// 将长时间停留在 Processing 的通知退回 Pending
    ///
    /// # 返回值
    ///
    /// 被释放的通知数量
    async fn release_stale_claims(&self, older_than: Duration) -> Result<u64, RepositoryError>;

    /// 删除通知
    ///
    /// # 返回值
    ///
    /// 记录存在并被删除时返回 true
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
