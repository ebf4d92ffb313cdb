//! Database operations for users.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::entity::user::{self, Entity as User};
use crate::error::{AppError, AppResult};

/// Partial update of a user's integration settings.
///
/// `None` leaves a field unchanged; `Some("")` clears it. Token fields must
/// already be encrypted by the caller.
#[derive(Debug, Default)]
pub struct SettingsUpdate {
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
    pub gitlab_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub jira_workspace: Option<String>,
    pub jira_project_keys: Option<String>,
}

/// Create a new user account.
pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    password_hash: &str,
) -> AppResult<user::Model> {
    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        github_token: Set(None),
        gitlab_token: Set(None),
        gitlab_url: Set(None),
        jira_email: Set(None),
        jira_token: Set(None),
        jira_workspace: Set(None),
        jira_project_keys: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let inserted = model.insert(db).await.map_err(|e| {
        if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) {
            AppError::InvalidInput("email already registered".to_string())
        } else {
            AppError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(inserted)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<user::Model>> {
    Ok(User::find_by_id(id).one(db).await?)
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> AppResult<Option<user::Model>> {
    Ok(User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<user::Model>> {
    Ok(User::find().all(db).await?)
}

/// Users with a complete issue-tracker configuration (token, workspace, email).
pub async fn list_with_tracker_credentials(
    db: &DatabaseConnection,
) -> AppResult<Vec<user::Model>> {
    Ok(User::find()
        .filter(user::Column::JiraToken.is_not_null())
        .filter(user::Column::JiraToken.ne(""))
        .filter(user::Column::JiraWorkspace.is_not_null())
        .filter(user::Column::JiraWorkspace.ne(""))
        .filter(user::Column::JiraEmail.is_not_null())
        .filter(user::Column::JiraEmail.ne(""))
        .all(db)
        .await?)
}

/// Apply a partial settings update.
pub async fn update_settings(
    db: &DatabaseConnection,
    id: Uuid,
    update: SettingsUpdate,
) -> AppResult<user::Model> {
    let existing = find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let mut active: user::ActiveModel = existing.into();

    let set_opt = |value: Option<String>| value.map(|v| if v.is_empty() { None } else { Some(v) });

    if let Some(v) = set_opt(update.github_token) {
        active.github_token = Set(v);
    }
    if let Some(v) = set_opt(update.gitlab_token) {
        active.gitlab_token = Set(v);
    }
    if let Some(v) = set_opt(update.gitlab_url) {
        active.gitlab_url = Set(v);
    }
    if let Some(v) = set_opt(update.jira_email) {
        active.jira_email = Set(v);
    }
    if let Some(v) = set_opt(update.jira_token) {
        active.jira_token = Set(v);
    }
    if let Some(v) = set_opt(update.jira_workspace) {
        active.jira_workspace = Set(v);
    }
    if let Some(v) = set_opt(update.jira_project_keys) {
        active.jira_project_keys = Set(v);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}
