//! Tracked source repository entity.
//!
//! `is_valid` and `last_synced_at` are recomputed by every sync attempt.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "repositories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner: String,
    pub name: String,
    /// "github" or "gitlab", see `models::Provider`
    pub provider: String,
    pub url: String,
    pub is_valid: bool,
    pub last_synced_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::commit::Entity")]
    Commits,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::commit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
