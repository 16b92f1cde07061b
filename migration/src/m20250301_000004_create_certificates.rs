use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certificates::EnrollmentId).uuid().not_null())
                    .col(ColumnDef::new(Certificates::CertificateUrl).string().not_null())
                    .col(
                        ColumnDef::new(Certificates::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Certificates::ExpiresAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // One certificate per enrollment
        manager
            .create_index(
                Index::create()
                    .name("idx_certificates_enrollment_id")
                    .table(Certificates::Table)
                    .col(Certificates::EnrollmentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Certificates {
    Table,
    Id,
    EnrollmentId,
    CertificateUrl,
    IssuedAt,
    ExpiresAt,
}
