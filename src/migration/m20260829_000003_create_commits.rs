//! Create commits table.
//!
//! The SHA unique index is global, not per-repository. It is the sole
//! concurrency-correctness mechanism for duplicate-insert races.

use sea_orm_migration::prelude::*;

use super::m20260829_000002_create_repositories::Repositories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Commits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Commits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Commits::RepoId).uuid().not_null())
                    .col(ColumnDef::new(Commits::Sha).string().not_null().unique_key())
                    .col(ColumnDef::new(Commits::Message).text().not_null())
                    .col(ColumnDef::new(Commits::Author).string().not_null())
                    .col(ColumnDef::new(Commits::AuthorEmail).string().not_null())
                    .col(ColumnDef::new(Commits::Branch).string().not_null())
                    .col(
                        ColumnDef::new(Commits::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Commits::CardKey).string())
                    .col(
                        ColumnDef::new(Commits::HasLink)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Commits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_commits_repo_id")
                            .from(Commits::Table, Commits::RepoId)
                            .to(Repositories::Table, Repositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commits_repo_id")
                    .table(Commits::Table)
                    .col(Commits::RepoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commits_date")
                    .table(Commits::Table)
                    .col(Commits::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commits_card_key")
                    .table(Commits::Table)
                    .col(Commits::CardKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Commits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Commits {
    Table,
    Id,
    RepoId,
    Sha,
    Message,
    Author,
    AuthorEmail,
    Branch,
    Date,
    CardKey,
    HasLink,
    CreatedAt,
}
