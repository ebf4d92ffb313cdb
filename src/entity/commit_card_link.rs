//! Manual commit-to-card link entity.
//!
//! Created only by explicit user action; never auto-deleted. One commit may
//! link to multiple cards independently of the extracted key.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "commit_card_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub commit_id: Uuid,
    pub card_key: String,
    pub linked_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::commit::Entity",
        from = "Column::CommitId",
        to = "super::commit::Column::Id"
    )]
    Commit,
}

impl Related<super::commit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
