//! Create repositories table.

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
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Repositories::UserId).uuid().not_null())
                    .col(ColumnDef::new(Repositories::Owner).string().not_null())
                    .col(ColumnDef::new(Repositories::Name).string().not_null())
                    .col(ColumnDef::new(Repositories::Provider).string().not_null())
                    .col(ColumnDef::new(Repositories::Url).string().not_null())
                    .col(
                        ColumnDef::new(Repositories::IsValid)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Repositories::LastSyncedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Repositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_repositories_user_id")
                            .from(Repositories::Table, Repositories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_user_id")
                    .table(Repositories::Table)
                    .col(Repositories::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Repositories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Repositories {
    Table,
    Id,
    UserId,
    Owner,
    Name,
    Provider,
    Url,
    IsValid,
    LastSyncedAt,
    CreatedAt,
}
