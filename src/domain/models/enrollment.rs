// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 选课实体
///
/// 表示一个用户对某门课程的注册。`progress_percentage` 是最近一次
/// 计算结果的冗余副本，业务判断始终以课时记录重新计算为准。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// 选课唯一标识符
    pub id: Uuid,
    /// 学员ID
    pub user_id: Uuid,
    /// 课程ID
    pub course_id: Uuid,
    /// 选课状态
    pub status: EnrollmentStatus,
    /// 最近一次计算的完成百分比
    pub progress_percentage: f64,
    /// 选课时间
    pub enrolled_at: DateTime<Utc>,
    /// 完成时间
    pub completed_at: Option<DateTime<Utc>>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

/// 选课状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// 学习中
    #[default]
    Active,
    /// 已完成全部课时
    Completed,
    /// 已退课
    Cancelled,
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnrollmentStatus::Active => write!(f, "active"),
            EnrollmentStatus::Completed => write!(f, "completed"),
            EnrollmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "cancelled" => Ok(EnrollmentStatus::Cancelled),
            _ => Err(()),
        }
    }
}

impl Enrollment {
    /// 创建新的选课记录
    pub fn new(user_id: Uuid, course_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            status: EnrollmentStatus::Active,
            progress_percentage: 0.0,
            enrolled_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    /// 应用最新计算出的进度
    ///
    /// 达到 100% 时进入 Completed，回落时恢复为 Active。已退课的选课只更新百分比。
    pub fn apply_progress(&mut self, percentage: f64) {
        self.progress_percentage = percentage;
        self.updated_at = Utc::now();

        match self.status {
            EnrollmentStatus::Cancelled => {}
            _ if percentage >= 100.0 => {
                if self.status != EnrollmentStatus::Completed {
                    self.status = EnrollmentStatus::Completed;
                    self.completed_at = Some(self.updated_at);
                }
            }
            _ => {
                self.status = EnrollmentStatus::Active;
                self.completed_at = None;
            }
        }
    }
}

/// 课时完成记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    /// 记录唯一标识符
    pub id: Uuid,
    /// 所属选课ID
    pub enrollment_id: Uuid,
    /// 课时ID
    pub lesson_id: Uuid,
    /// 是否完成
    pub is_completed: bool,
    /// 完成时间
    pub completed_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    /// 为选课新建一条未完成的课时记录
    pub fn new(enrollment_id: Uuid, lesson_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            enrollment_id,
            lesson_id,
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 设置完成状态
    ///
    /// # 返回值
    ///
    /// 状态实际发生变化时返回 true
    pub fn set_completed(&mut self, completed: bool) -> bool {
        if self.is_completed == completed {
            return false;
        }
        let now = Utc::now();
        self.is_completed = completed;
        self.completed_at = completed.then_some(now);
        self.updated_at = now;
        true
    }
}

/// 选课进度聚合
///
/// 由课时记录派生，不单独持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentProgress {
    pub enrollment_id: Uuid,
    /// 按课时ID排序的记录
    pub lessons: Vec<LessonProgress>,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub progress_percentage: f64,
}

impl EnrollmentProgress {
    /// 从课时记录构建进度聚合
    pub fn from_records(enrollment_id: Uuid, mut lessons: Vec<LessonProgress>) -> Self {
        lessons.sort_by_key(|l| l.lesson_id);
        let total_lessons = lessons.len();
        let completed_lessons = lessons.iter().filter(|l| l.is_completed).count();

        Self {
            enrollment_id,
            lessons,
            completed_lessons,
            total_lessons,
            progress_percentage: calculate_percentage(completed_lessons, total_lessons),
        }
    }

    /// 是否已完成全部课时；没有课时记录的选课视为未完成
    pub fn is_complete(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons == self.total_lessons
    }
}

/// 计算完成百分比
///
/// 结果保留两位小数并四舍五入（half-up），`total` 为 0 时返回 0。
/// 使用整数万分位运算，避免浮点误差影响舍入。
pub fn calculate_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    let basis_points = (completed * 20_000 + total) / (2 * total);
    basis_points as f64 / 100.0
}
