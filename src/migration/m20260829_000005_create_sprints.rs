//! Create sprints table.

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
                    .table(Sprints::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sprints::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sprints::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Sprints::ForeignId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Sprints::Name).string().not_null())
                    .col(ColumnDef::new(Sprints::State).string().not_null())
                    .col(ColumnDef::new(Sprints::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Sprints::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Sprints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sprints_user_id")
                            .from(Sprints::Table, Sprints::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sprints_user_id")
                    .table(Sprints::Table)
                    .col(Sprints::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sprints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Sprints {
    Table,
    Id,
    UserId,
    ForeignId,
    Name,
    State,
    StartDate,
    EndDate,
    CreatedAt,
}
