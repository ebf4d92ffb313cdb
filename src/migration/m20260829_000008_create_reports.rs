//! Create reports table.

use sea_orm_migration::prelude::*;

use super::m20260829_000001_create_users::Users;
use super::m20260829_000007_create_report_templates::ReportTemplates;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reports::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reports::UserId).uuid().not_null())
                    .col(ColumnDef::new(Reports::TemplateId).uuid())
                    .col(ColumnDef::new(Reports::Date).string_len(10).not_null())
                    .col(ColumnDef::new(Reports::Title).string().not_null())
                    .col(ColumnDef::new(Reports::Content).text().not_null())
                    .col(ColumnDef::new(Reports::FileUrl).string().not_null())
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_user_id")
                            .from(Reports::Table, Reports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_template_id")
                            .from(Reports::Table, Reports::TemplateId)
                            .to(ReportTemplates::Table, ReportTemplates::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One report row per (user, date); regeneration updates in place.
        manager
            .create_index(
                Index::create()
                    .name("idx_reports_user_date")
                    .table(Reports::Table)
                    .col(Reports::UserId)
                    .col(Reports::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reports {
    Table,
    Id,
    UserId,
    TemplateId,
    Date,
    Title,
    Content,
    FileUrl,
    CreatedAt,
    UpdatedAt,
}
