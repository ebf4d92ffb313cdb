//! User account entity.
//!
//! Credential columns hold opaque ciphertext; they are decrypted only
//! transiently inside a sync or report operation.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
    pub gitlab_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub jira_workspace: Option<String>,
    /// Comma-separated project key prefixes, e.g. "PDT,CORE". Empty = no filter.
    pub jira_project_keys: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::repository::Entity")]
    Repositories,
    #[sea_orm(has_many = "super::sprint::Entity")]
    Sprints,
    #[sea_orm(has_many = "super::jira_card::Entity")]
    JiraCards,
    #[sea_orm(has_many = "super::report_template::Entity")]
    ReportTemplates,
    #[sea_orm(has_many = "super::report::Entity")]
    Reports,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repositories.def()
    }
}

impl Related<super::sprint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sprints.def()
    }
}

impl Related<super::jira_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JiraCards.def()
    }
}

impl Related<super::report_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportTemplates.def()
    }
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
