use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LessonProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LessonProgress::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LessonProgress::EnrollmentId).uuid().not_null())
                    .col(ColumnDef::new(LessonProgress::LessonId).uuid().not_null())
                    .col(
                        ColumnDef::new(LessonProgress::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LessonProgress::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(LessonProgress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LessonProgress::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lesson_progress_enrollment_lesson")
                    .table(LessonProgress::Table)
                    .col(LessonProgress::EnrollmentId)
                    .col(LessonProgress::LessonId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LessonProgress::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LessonProgress {
    Table,
    Id,
    EnrollmentId,
    LessonId,
    IsCompleted,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}
