// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrollment::{EnrollmentProgress, LessonProgress};
use crate::domain::repositories::enrollment_repository::EnrollmentRepository;
use crate::domain::repositories::lesson_progress_repository::LessonProgressRepository;
use crate::utils::errors::RepositoryError;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// 进度服务错误
#[derive(Error, Debug)]
pub enum ProgressError {
    /// 选课或课时记录不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ProgressError {
    pub fn code(&self) -> &'static str {
        match self {
            ProgressError::NotFound(_) => "NOT_FOUND",
            ProgressError::Repository(e) => e.code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ProgressError::NotFound(_) => 404,
            ProgressError::Repository(e) => e.http_status(),
        }
    }
}

/// 学习进度服务
///
/// 根据课时完成记录计算选课进度。百分比每次都从记录重新计算，
/// 选课上保存的副本只在记录变化后刷新，从不参与判断。
pub struct ProgressService {
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    lesson_repo: Arc<dyn LessonProgressRepository>,
}

impl ProgressService {
    /// 创建新的进度服务实例
    pub fn new(
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        lesson_repo: Arc<dyn LessonProgressRepository>,
    ) -> Self {
        Self {
            enrollment_repo,
            lesson_repo,
        }
    }

    /// 为选课登记课时
    ///
    /// 已登记的课时保持不变，新课时以未完成状态加入。
    ///
    /// # 参数
    ///
    /// * `enrollment_id` - 选课ID
    /// * `lesson_ids` - 课程包含的课时ID
    ///
    /// # 返回值
    ///
    /// * `Ok(EnrollmentProgress)` - 登记后的进度
    /// * `Err(ProgressError::NotFound)` - 选课不存在
    pub async fn register_lessons(
        &self,
        enrollment_id: Uuid,
        lesson_ids: &[Uuid],
    ) -> Result<EnrollmentProgress, ProgressError> {
        self.ensure_enrollment(enrollment_id).await?;

        let tracked: HashSet<Uuid> = self
            .lesson_repo
            .find_by_enrollment(enrollment_id)
            .await?
            .into_iter()
            .map(|l| l.lesson_id)
            .collect();

        let mut added = 0usize;
        let mut seen = HashSet::new();
        for lesson_id in lesson_ids {
            if tracked.contains(lesson_id) || !seen.insert(*lesson_id) {
                continue;
            }
            match self
                .lesson_repo
                .create(&LessonProgress::new(enrollment_id, *lesson_id))
                .await
            {
                Ok(_) => added += 1,
                // registered concurrently
                Err(RepositoryError::AlreadyExists) => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(%enrollment_id, added, "Registered lessons for enrollment");
        self.refresh_enrollment(enrollment_id).await?;
        self.get_progress(enrollment_id).await
    }

    /// 标记课时已完成
    ///
    /// 重复调用没有额外效果。
    ///
    /// # 返回值
    ///
    /// * `Ok(f64)` - 更新后的完成百分比
    /// * `Err(ProgressError::NotFound)` - 课时记录不存在
    pub async fn mark_complete(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<f64, ProgressError> {
        self.set_lesson_completed(enrollment_id, lesson_id, true)
            .await
    }

    /// 标记课时未完成
    ///
    /// # 返回值
    ///
    /// * `Ok(f64)` - 更新后的完成百分比
    /// * `Err(ProgressError::NotFound)` - 课时记录不存在
    pub async fn mark_incomplete(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<f64, ProgressError> {
        self.set_lesson_completed(enrollment_id, lesson_id, false)
            .await
    }

    /// 计算选课完成百分比
    ///
    /// 保留两位小数，没有课时记录时为 0。
    pub async fn calculate_progress(&self, enrollment_id: Uuid) -> Result<f64, ProgressError> {
        Ok(self.get_progress(enrollment_id).await?.progress_percentage)
    }

    /// 查询单个课时是否已完成
    pub async fn is_lesson_completed(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<bool, ProgressError> {
        let record = self.find_record(enrollment_id, lesson_id).await?;
        Ok(record.is_completed)
    }

    /// 获取选课的完整进度
    pub async fn get_progress(
        &self,
        enrollment_id: Uuid,
    ) -> Result<EnrollmentProgress, ProgressError> {
        self.ensure_enrollment(enrollment_id).await?;
        let lessons = self.lesson_repo.find_by_enrollment(enrollment_id).await?;
        Ok(EnrollmentProgress::from_records(enrollment_id, lessons))
    }

    async fn set_lesson_completed(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
        completed: bool,
    ) -> Result<f64, ProgressError> {
        let mut record = self.find_record(enrollment_id, lesson_id).await?;

        if record.set_completed(completed) {
            self.lesson_repo.update(&record).await?;
            debug!(%enrollment_id, %lesson_id, completed, "Lesson completion changed");
        }

        self.refresh_enrollment(enrollment_id).await
    }

    /// 重新计算并写回选课上的进度副本与状态
    async fn refresh_enrollment(&self, enrollment_id: Uuid) -> Result<f64, ProgressError> {
        let mut enrollment = self
            .enrollment_repo
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| ProgressError::NotFound(format!("enrollment {}", enrollment_id)))?;

        let lessons = self.lesson_repo.find_by_enrollment(enrollment_id).await?;
        let progress = EnrollmentProgress::from_records(enrollment_id, lessons);

        let previous_status = enrollment.status;
        enrollment.apply_progress(progress.progress_percentage);
        self.enrollment_repo.update(&enrollment).await?;

        if previous_status != enrollment.status {
            info!(
                %enrollment_id,
                from = %previous_status,
                to = %enrollment.status,
                progress = progress.progress_percentage,
                "Enrollment status changed"
            );
        }

        Ok(progress.progress_percentage)
    }

    async fn ensure_enrollment(&self, enrollment_id: Uuid) -> Result<(), ProgressError> {
        match self.enrollment_repo.find_by_id(enrollment_id).await? {
            Some(_) => Ok(()),
            None => Err(ProgressError::NotFound(format!(
                "enrollment {}",
                enrollment_id
            ))),
        }
    }

    async fn find_record(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<LessonProgress, ProgressError> {
        self.lesson_repo
            .find(enrollment_id, lesson_id)
            .await?
            .ok_or_else(|| {
                ProgressError::NotFound(format!(
                    "lesson {} in enrollment {}",
                    lesson_id, enrollment_id
                ))
            })
    }
}
