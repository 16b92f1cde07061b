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

use crate::domain::models::enrollment::Enrollment;
use crate::domain::repositories::enrollment_repository::EnrollmentRepository;
use crate::infrastructure::database::entities::enrollment as enrollment_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 选课仓库实现
#[derive(Clone)]
pub struct EnrollmentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl EnrollmentRepositoryImpl {
    /// 创建新的选课仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<enrollment_entity::Model> for Enrollment {
    type Error = RepositoryError;

    fn try_from(model: enrollment_entity::Model) -> Result<Self, Self::Error> {
        let status = model.status.parse().map_err(|_| {
            RepositoryError::Serialization(format!(
                "enrollment {} has unknown status '{}'",
                model.id, model.status
            ))
        })?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            course_id: model.course_id,
            status,
            progress_percentage: model.progress_percentage,
            enrolled_at: model.enrolled_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Enrollment> for enrollment_entity::ActiveModel {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: Set(enrollment.id),
            user_id: Set(enrollment.user_id),
            course_id: Set(enrollment.course_id),
            status: Set(enrollment.status.to_string()),
            progress_percentage: Set(enrollment.progress_percentage),
            enrolled_at: Set(enrollment.enrolled_at),
            completed_at: Set(enrollment.completed_at),
            updated_at: Set(enrollment.updated_at),
        }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentRepositoryImpl {
    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment, RepositoryError> {
        let model: enrollment_entity::ActiveModel = enrollment.into();
        model.insert(self.db.as_ref()).await?;
        Ok(enrollment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>, RepositoryError> {
        enrollment_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Enrollment::try_from)
            .transpose()
    }

    async fn find_by_user_and_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, RepositoryError> {
        enrollment_entity::Entity::find()
            .filter(enrollment_entity::Column::UserId.eq(user_id))
            .filter(enrollment_entity::Column::CourseId.eq(course_id))
            .one(self.db.as_ref())
            .await?
            .map(Enrollment::try_from)
            .transpose()
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, RepositoryError> {
        let model: enrollment_entity::ActiveModel = enrollment.into();
        let updated = model.update(self.db.as_ref()).await?;
        updated.try_into()
    }
}
