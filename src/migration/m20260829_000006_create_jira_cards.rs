//! Create jira_cards table.

use sea_orm_migration::prelude::*;

use super::m20260829_000001_create_users::Users;
use super::m20260829_000005_create_sprints::Sprints;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JiraCards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JiraCards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(JiraCards::UserId).uuid().not_null())
                    .col(ColumnDef::new(JiraCards::CardKey).string().not_null())
                    .col(ColumnDef::new(JiraCards::Summary).text().not_null())
                    .col(ColumnDef::new(JiraCards::Status).string().not_null())
                    .col(ColumnDef::new(JiraCards::Assignee).string().not_null())
                    .col(ColumnDef::new(JiraCards::SprintId).uuid())
                    .col(ColumnDef::new(JiraCards::DetailsJson).text())
                    .col(
                        ColumnDef::new(JiraCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JiraCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jira_cards_user_id")
                            .from(JiraCards::Table, JiraCards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jira_cards_sprint_id")
                            .from(JiraCards::Table, JiraCards::SprintId)
                            .to(Sprints::Table, Sprints::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One card row per (user, key); the upsert path relies on this.
        manager
            .create_index(
                Index::create()
                    .name("idx_jira_cards_user_card_key")
                    .table(JiraCards::Table)
                    .col(JiraCards::UserId)
                    .col(JiraCards::CardKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JiraCards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum JiraCards {
    Table,
    Id,
    UserId,
    CardKey,
    Summary,
    Status,
    Assignee,
    SprintId,
    DetailsJson,
    CreatedAt,
    UpdatedAt,
}
