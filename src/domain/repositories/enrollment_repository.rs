// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrollment::Enrollment;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 选课仓库特质
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// 创建选课
    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment, RepositoryError>;
    /// 根据ID查找选课
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Enrollment>, RepositoryError>;
    /// 按学员和课程查找选课
    async fn find_by_user_and_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, RepositoryError>;
    /// 更新选课
    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, RepositoryError>;
}
