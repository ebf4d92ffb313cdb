//! Create users table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::GithubToken).text())
                    .col(ColumnDef::new(Users::GitlabToken).text())
                    .col(ColumnDef::new(Users::GitlabUrl).string())
                    .col(ColumnDef::new(Users::JiraEmail).string())
                    .col(ColumnDef::new(Users::JiraToken).text())
                    .col(ColumnDef::new(Users::JiraWorkspace).string())
                    .col(ColumnDef::new(Users::JiraProjectKeys).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    GithubToken,
    GitlabToken,
    GitlabUrl,
    JiraEmail,
    JiraToken,
    JiraWorkspace,
    JiraProjectKeys,
    CreatedAt,
    UpdatedAt,
}
