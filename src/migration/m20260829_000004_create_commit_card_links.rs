//! Create commit_card_links table.

use sea_orm_migration::prelude::*;

use super::m20260829_000003_create_commits::Commits;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommitCardLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommitCardLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommitCardLinks::CommitId).uuid().not_null())
                    .col(ColumnDef::new(CommitCardLinks::CardKey).string().not_null())
                    .col(
                        ColumnDef::new(CommitCardLinks::LinkedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_commit_card_links_commit_id")
                            .from(CommitCardLinks::Table, CommitCardLinks::CommitId)
                            .to(Commits::Table, Commits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_commit_card_links_commit_id")
                    .table(CommitCardLinks::Table)
                    .col(CommitCardLinks::CommitId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommitCardLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CommitCardLinks {
    Table,
    Id,
    CommitId,
    CardKey,
    LinkedAt,
}
