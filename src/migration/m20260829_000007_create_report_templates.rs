//! Create report_templates table.

use sea_orm_migration::prelude::*;

use super::m20260829_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportTemplates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportTemplates::UserId).uuid().not_null())
                    .col(ColumnDef::new(ReportTemplates::Name).string().not_null())
                    .col(ColumnDef::new(ReportTemplates::Content).text().not_null())
                    .col(
                        ColumnDef::new(ReportTemplates::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ReportTemplates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportTemplates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_templates_user_id")
                            .from(ReportTemplates::Table, ReportTemplates::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_templates_user_id")
                    .table(ReportTemplates::Table)
                    .col(ReportTemplates::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportTemplates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ReportTemplates {
    Table,
    Id,
    UserId,
    Name,
    Content,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}
