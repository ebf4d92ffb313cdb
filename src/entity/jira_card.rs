//! Issue-tracker card entity, keyed by (user, card key).
//!
//! `details_json` caches parent/subtask/changelog detail and is refreshed
//! only by the full background sync.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jira_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_key: String,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub sprint_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub details_json: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::sprint::Entity",
        from = "Column::SprintId",
        to = "super::sprint::Column::Id"
    )]
    Sprint,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::sprint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sprint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
