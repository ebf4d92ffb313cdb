//! User-facing representation of an account.
//!
//! Credential ciphertext never leaves the server; responses only reveal
//! whether each credential is configured.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::user;

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub gitlab_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_workspace: Option<String>,
    pub jira_project_keys: Option<String>,
    pub has_github_token: bool,
    pub has_gitlab_token: bool,
    pub has_jira_token: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        UserResponse {
            id: m.id,
            email: m.email,
            gitlab_url: m.gitlab_url,
            jira_email: m.jira_email,
            jira_workspace: m.jira_workspace,
            jira_project_keys: m.jira_project_keys,
            has_github_token: m.github_token.as_deref().is_some_and(|t| !t.is_empty()),
            has_gitlab_token: m.gitlab_token.as_deref().is_some_and(|t| !t.is_empty()),
            has_jira_token: m.jira_token.as_deref().is_some_and(|t| !t.is_empty()),
            created_at: m.created_at,
        }
    }
}
