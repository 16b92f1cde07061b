// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::notification::{Notification, NotificationStatus};
use crate::domain::repositories::notification_repository::NotificationRepository;
use crate::infrastructure::database::entities::notification as notification_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 通知仓库实现
///
/// 基于SeaORM实现的通知数据访问层
#[derive(Clone)]
pub struct NotificationRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl NotificationRepositoryImpl {
    /// 创建新的通知仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<notification_entity::Model> for Notification {
    type Error = RepositoryError;

    fn try_from(model: notification_entity::Model) -> Result<Self, Self::Error> {
        let notification_type = model.notification_type.parse().map_err(|_| {
            RepositoryError::Serialization(format!(
                "notification {} has unknown type '{}'",
                model.id, model.notification_type
            ))
        })?;
        let status = model.status.parse().map_err(|_| {
            RepositoryError::Serialization(format!(
                "notification {} has unknown status '{}'",
                model.id, model.status
            ))
        })?;
        let metadata: HashMap<String, String> = serde_json::from_value(model.metadata)
            .map_err(|e| {
                RepositoryError::Serialization(format!(
                    "notification {} has invalid metadata: {}",
                    model.id, e
                ))
            })?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            notification_type,
            title: model.title,
            content: model.content,
            metadata,
            status,
            failure_reason: model.failure_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
            sent_at: model.sent_at,
            scheduled_at: model.scheduled_at,
        })
    }
}

impl From<&Notification> for notification_entity::ActiveModel {
    fn from(notification: &Notification) -> Self {
        Self {
            id: Set(notification.id),
            user_id: Set(notification.user_id.clone()),
            notification_type: Set(notification.notification_type.to_string()),
            title: Set(notification.title.clone()),
            content: Set(notification.content.clone()),
            metadata: Set(serde_json::json!(notification.metadata)),
            status: Set(notification.status.to_string()),
            failure_reason: Set(notification.failure_reason.clone()),
            scheduled_at: Set(notification.scheduled_at),
            sent_at: Set(notification.sent_at),
            created_at: Set(notification.created_at),
            updated_at: Set(notification.updated_at),
        }
    }
}

fn into_domain(
    models: Vec<notification_entity::Model>,
) -> Result<Vec<Notification>, RepositoryError> {
    models.into_iter().map(Notification::try_from).collect()
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn save(&self, notification: &Notification) -> Result<Notification, RepositoryError> {
        let model: notification_entity::ActiveModel = notification.into();

        notification_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(notification_entity::Column::Id)
                    .update_columns([
                        notification_entity::Column::Title,
                        notification_entity::Column::Content,
                        notification_entity::Column::Metadata,
                        notification_entity::Column::Status,
                        notification_entity::Column::FailureReason,
                        notification_entity::Column::ScheduledAt,
                        notification_entity::Column::SentAt,
                        notification_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(notification.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, RepositoryError> {
        let model = notification_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Notification::try_from).transpose()
    }

    async fn find_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let models = notification_entity::Entity::find()
            .filter(notification_entity::Column::UserId.eq(user_id))
            .order_by_desc(notification_entity::Column::CreatedAt)
            .order_by_desc(notification_entity::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;

        into_domain(models)
    }

    async fn find_pending(&self, limit: u64) -> Result<Vec<Notification>, RepositoryError> {
        let models = notification_entity::Entity::find()
            .filter(notification_entity::Column::Status.eq(NotificationStatus::Pending.to_string()))
            .filter(
                Condition::any()
                    .add(notification_entity::Column::ScheduledAt.is_null())
                    .add(notification_entity::Column::ScheduledAt.lte(Utc::now())),
            )
            .order_by_asc(notification_entity::Column::CreatedAt)
            .order_by_asc(notification_entity::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        into_domain(models)
    }

    async fn claim(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = notification_entity::Entity::update_many()
            .col_expr(
                notification_entity::Column::Status,
                Expr::value(NotificationStatus::Processing.to_string()),
            )
            .col_expr(notification_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification_entity::Column::Id.eq(id))
            .filter(notification_entity::Column::Status.eq(NotificationStatus::Pending.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn complete_claim(
        &self,
        id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = notification_entity::Entity::update_many()
            .col_expr(
                notification_entity::Column::Status,
                Expr::value(NotificationStatus::Sent.to_string()),
            )
            .col_expr(notification_entity::Column::SentAt, Expr::value(sent_at))
            .col_expr(notification_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notification_entity::Column::Id.eq(id))
            .filter(
                notification_entity::Column::Status.eq(NotificationStatus::Processing.to_string()),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn release_stale_claims(&self, older_than: Duration) -> Result<u64, RepositoryError> {
        let threshold = Utc::now() - older_than;

        let result = notification_entity::Entity::update_many()
            .col_expr(
                notification_entity::Column::Status,
                Expr::value(NotificationStatus::Pending.to_string()),
            )
            .col_expr(notification_entity::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(
                notification_entity::Column::Status.eq(NotificationStatus::Processing.to_string()),
            )
            .filter(notification_entity::Column::UpdatedAt.lt(threshold))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = notification_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected > 0)
    }
}
