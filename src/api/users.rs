//! Profile and integration-settings endpoints.

use actix_web::{HttpResponse, get, put, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::AuthedUser;
use crate::crypto::TokenCipher;
use crate::db::{self, users::SettingsUpdate};
use crate::error::{AppError, AppResult};
use crate::models::UserResponse;
use crate::services::jira::JiraClient;

/// Partial settings update. Absent fields are left unchanged; an empty
/// string clears the field.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub github_token: Option<String>,
    pub gitlab_token: Option<String>,
    pub gitlab_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub jira_workspace: Option<String>,
    pub jira_project_keys: Option<String>,
}

#[get("/users/me")]
pub async fn me(auth: AuthedUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let user = db::users::find_by_id(&db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[put("/users/me/settings")]
pub async fn update_settings(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    cipher: web::Data<TokenCipher>,
    body: web::Json<UpdateSettingsRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    // New tracker credentials are probed upstream before they are stored.
    // Workspace and email fall back to the stored values when the request
    // only rotates the token.
    if let Some(token) = body.jira_token.as_deref().filter(|t| !t.is_empty()) {
        let existing = db::users::find_by_id(&db, auth.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let workspace = body
            .jira_workspace
            .clone()
            .filter(|s| !s.is_empty())
            .or(existing.jira_workspace);
        let email = body
            .jira_email
            .clone()
            .filter(|s| !s.is_empty())
            .or(existing.jira_email);

        if let (Some(workspace), Some(email)) = (workspace, email) {
            JiraClient::new(&workspace, &email, token)
                .validate()
                .await
                .map_err(|e| AppError::InvalidInput(format!("tracker credentials rejected: {}", e)))?;
        }
    }

    // Token fields are encrypted before they touch storage. The cipher maps
    // empty to empty, so clearing still works.
    let encrypt_opt = |value: Option<String>| -> AppResult<Option<String>> {
        value.map(|v| cipher.encrypt(&v)).transpose()
    };

    let update = SettingsUpdate {
        github_token: encrypt_opt(body.github_token)?,
        gitlab_token: encrypt_opt(body.gitlab_token)?,
        gitlab_url: body.gitlab_url,
        jira_email: body.jira_email,
        jira_token: encrypt_opt(body.jira_token)?,
        jira_workspace: body.jira_workspace,
        jira_project_keys: body.jira_project_keys,
    };

    let user = db::users::update_settings(&db, auth.user_id, update).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(me).service(update_settings);
}
