// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrollment::LessonProgress;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 课时进度仓库特质
#[async_trait]
pub trait LessonProgressRepository: Send + Sync {
    /// 创建课时记录，(enrollment_id, lesson_id) 重复时返回 `AlreadyExists`
    async fn create(&self, progress: &LessonProgress) -> Result<LessonProgress, RepositoryError>;
    /// 查找单条课时记录
    async fn find(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<LessonProgress>, RepositoryError>;
    /// 查找选课下的全部课时记录
    async fn find_by_enrollment(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<LessonProgress>, RepositoryError>;
    /// 更新课时记录
    async fn update(&self, progress: &LessonProgress) -> Result<LessonProgress, RepositoryError>;
}
