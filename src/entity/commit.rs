//! Commit entity.
//!
//! Append-only historical fact keyed by a globally unique SHA. The only
//! permitted mutation is the `has_link` false-to-true transition when a
//! manual card link is created.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "commits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub repo_id: Uuid,
    /// Unique across all repositories, not per-repository.
    #[sea_orm(unique)]
    pub sha: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub branch: String,
    pub date: DateTimeUtc,
    /// Issue key extracted from the first line of the message, if any.
    pub card_key: Option<String>,
    pub has_link: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repository::Entity",
        from = "Column::RepoId",
        to = "super::repository::Column::Id"
    )]
    Repository,
    #[sea_orm(has_many = "super::commit_card_link::Entity")]
    CardLinks,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl Related<super::commit_card_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
