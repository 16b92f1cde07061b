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

use crate::domain::models::enrollment::LessonProgress;
use crate::domain::repositories::lesson_progress_repository::LessonProgressRepository;
use crate::infrastructure::database::entities::lesson_progress as lesson_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 课时进度仓库实现
#[derive(Clone)]
pub struct LessonProgressRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl LessonProgressRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<lesson_entity::Model> for LessonProgress {
    fn from(model: lesson_entity::Model) -> Self {
        Self {
            id: model.id,
            enrollment_id: model.enrollment_id,
            lesson_id: model.lesson_id,
            is_completed: model.is_completed,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&LessonProgress> for lesson_entity::ActiveModel {
    fn from(progress: &LessonProgress) -> Self {
        Self {
            id: Set(progress.id),
            enrollment_id: Set(progress.enrollment_id),
            lesson_id: Set(progress.lesson_id),
            is_completed: Set(progress.is_completed),
            completed_at: Set(progress.completed_at),
            created_at: Set(progress.created_at),
            updated_at: Set(progress.updated_at),
        }
    }
}

#[async_trait]
impl LessonProgressRepository for LessonProgressRepositoryImpl {
    async fn create(&self, progress: &LessonProgress) -> Result<LessonProgress, RepositoryError> {
        let model: lesson_entity::ActiveModel = progress.into();
        model.insert(self.db.as_ref()).await?;
        Ok(progress.clone())
    }

    async fn find(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<LessonProgress>, RepositoryError> {
        let model = lesson_entity::Entity::find()
            .filter(lesson_entity::Column::EnrollmentId.eq(enrollment_id))
            .filter(lesson_entity::Column::LessonId.eq(lesson_id))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_enrollment(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<LessonProgress>, RepositoryError> {
        let models = lesson_entity::Entity::find()
            .filter(lesson_entity::Column::EnrollmentId.eq(enrollment_id))
            .order_by_asc(lesson_entity::Column::LessonId)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, progress: &LessonProgress) -> Result<LessonProgress, RepositoryError> {
        let model: lesson_entity::ActiveModel = progress.into();
        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }
}
