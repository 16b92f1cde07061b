// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::setup_db;
use learnhub::domain::models::enrollment::{Enrollment, EnrollmentStatus};
use learnhub::domain::repositories::enrollment_repository::EnrollmentRepository;
use learnhub::domain::services::progress_service::{ProgressError, ProgressService};
use learnhub::infrastructure::repositories::enrollment_repo_impl::EnrollmentRepositoryImpl;
use learnhub::infrastructure::repositories::lesson_progress_repo_impl::LessonProgressRepositoryImpl;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

pub struct ProgressFixture {
    pub db: Arc<DatabaseConnection>,
    pub enrollments: Arc<EnrollmentRepositoryImpl>,
    pub service: Arc<ProgressService>,
    pub enrollment: Enrollment,
    pub lessons: Vec<Uuid>,
}

/// 创建一个选课并登记 `lesson_count` 个课时
pub async fn progress_fixture(lesson_count: usize) -> ProgressFixture {
    let db = setup_db().await;
    let enrollments = Arc::new(EnrollmentRepositoryImpl::new(db.clone()));
    let lesson_repo = Arc::new(LessonProgressRepositoryImpl::new(db.clone()));
    let service = Arc::new(ProgressService::new(enrollments.clone(), lesson_repo));

    let enrollment = Enrollment::new(Uuid::new_v4(), Uuid::new_v4());
    enrollments.create(&enrollment).await.unwrap();

    let lessons: Vec<Uuid> = (0..lesson_count).map(|_| Uuid::new_v4()).collect();
    if !lessons.is_empty() {
        service
            .register_lessons(enrollment.id, &lessons)
            .await
            .unwrap();
    }

    ProgressFixture {
        db,
        enrollments,
        service,
        enrollment,
        lessons,
    }
}

#[tokio::test]
async fn test_no_lessons_means_zero_progress() {
    let f = progress_fixture(0).await;

    assert_eq!(f.service.calculate_progress(f.enrollment.id).await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_half_completed() {
    let f = progress_fixture(4).await;

    f.service.mark_complete(f.enrollment.id, f.lessons[0]).await.unwrap();
    let pct = f.service.mark_complete(f.enrollment.id, f.lessons[1]).await.unwrap();

    assert_eq!(pct, 50.0);
    assert_eq!(f.service.calculate_progress(f.enrollment.id).await.unwrap(), 50.0);
    let stored = f.enrollments.find_by_id(f.enrollment.id).await.unwrap().unwrap();
    assert_eq!(stored.progress_percentage, 50.0);
    assert_eq!(stored.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn test_all_completed_moves_enrollment_to_completed() {
    let f = progress_fixture(4).await;

    for lesson in &f.lessons {
        f.service.mark_complete(f.enrollment.id, *lesson).await.unwrap();
    }

    assert_eq!(f.service.calculate_progress(f.enrollment.id).await.unwrap(), 100.0);
    let stored = f.enrollments.find_by_id(f.enrollment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnrollmentStatus::Completed);
    assert!(stored.completed_at.is_some());

    // un-completing a lesson reopens the enrollment
    let pct = f.service.mark_incomplete(f.enrollment.id, f.lessons[3]).await.unwrap();
    assert_eq!(pct, 75.0);
    let stored = f.enrollments.find_by_id(f.enrollment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnrollmentStatus::Active);
    assert!(!f
        .service
        .is_lesson_completed(f.enrollment.id, f.lessons[3])
        .await
        .unwrap());
}

#[tokio::test]
async fn test_mark_complete_is_idempotent() {
    let f = progress_fixture(3).await;

    let first = f.service.mark_complete(f.enrollment.id, f.lessons[0]).await.unwrap();
    let second = f.service.mark_complete(f.enrollment.id, f.lessons[0]).await.unwrap();

    assert_eq!(first, 33.33);
    assert_eq!(second, first);
    assert!(f
        .service
        .is_lesson_completed(f.enrollment.id, f.lessons[0])
        .await
        .unwrap());
}

#[tokio::test]
async fn test_register_lessons_skips_known_and_duplicates() {
    let f = progress_fixture(2).await;
    let extra = Uuid::new_v4();

    let progress = f
        .service
        .register_lessons(f.enrollment.id, &[f.lessons[0], extra, extra])
        .await
        .unwrap();

    assert_eq!(progress.total_lessons, 3);
    assert_eq!(progress.completed_lessons, 0);
}

#[tokio::test]
async fn test_unknown_records_are_not_found() {
    let f = progress_fixture(1).await;

    let err = f
        .service
        .mark_complete(f.enrollment.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::NotFound(_)));
    assert_eq!(err.http_status(), 404);

    let err = f.service.calculate_progress(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ProgressError::NotFound(_)));

    let err = f
        .service
        .register_lessons(Uuid::new_v4(), &[Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressError::NotFound(_)));
}
