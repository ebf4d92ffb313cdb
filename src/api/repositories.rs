//! Tracked-repository endpoints.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::crypto::TokenCipher;
use crate::db;
use crate::entity::repository;
use crate::error::{AppError, AppResult};
use crate::models::Provider;
use crate::services::providers::{CommitProvider, GithubClient, GitlabClient};

#[derive(Debug, Deserialize)]
pub struct AddRepositoryRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RepositoryResponse {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub provider: String,
    pub url: String,
    pub is_valid: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<repository::Model> for RepositoryResponse {
    fn from(m: repository::Model) -> Self {
        RepositoryResponse {
            id: m.id,
            owner: m.owner,
            name: m.name,
            provider: m.provider,
            url: m.url,
            is_valid: m.is_valid,
            last_synced_at: m.last_synced_at,
            created_at: m.created_at,
        }
    }
}

/// Split an https clone URL into (owner, name, provider).
///
/// Hosts containing "github.com" map to GitHub; everything else is assumed
/// GitLab-flavored (gitlab.com or self-hosted). A GitLab subgroup path stays
/// part of the name.
fn parse_repo_url(raw: &str) -> AppResult<(String, String, Provider)> {
    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .ok_or_else(|| AppError::InvalidInput("repository URL must be http(s)".to_string()))?;

    let (host, path) = rest
        .split_once('/')
        .ok_or_else(|| AppError::InvalidInput("repository URL has no path".to_string()))?;

    let path = path.trim_matches('/').trim_end_matches(".git");
    let (owner, name) = path
        .split_once('/')
        .filter(|(o, n)| !o.is_empty() && !n.is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput("repository URL must contain owner/name".to_string())
        })?;

    let provider = if host.to_lowercase().contains("github.com") {
        Provider::Github
    } else {
        Provider::Gitlab
    };

    Ok((owner.to_string(), name.to_string(), provider))
}

#[get("/repositories")]
pub async fn list(auth: AuthedUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let repos = db::repositories::list_for_user(&db, auth.user_id).await?;
    let response: Vec<RepositoryResponse> = repos.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// Track a new repository.
///
/// The stored token for the matching provider is probed with a
/// `validate_access` call before the row is created.
#[post("/repositories")]
pub async fn add(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    cipher: web::Data<TokenCipher>,
    body: web::Json<AddRepositoryRequest>,
) -> AppResult<HttpResponse> {
    let (owner, name, provider) = parse_repo_url(&body.url)?;

    let user = db::users::find_by_id(&db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let existing = db::repositories::list_for_user(&db, auth.user_id).await?;
    if existing.iter().any(|r| {
        r.owner == owner && r.name == name && r.provider == provider.as_str()
    }) {
        return Err(AppError::InvalidInput(
            "repository already tracked".to_string(),
        ));
    }

    let (client, encrypted): (Box<dyn CommitProvider>, Option<&str>) = match provider {
        Provider::Github => (Box::new(GithubClient::new()), user.github_token.as_deref()),
        Provider::Gitlab => (
            Box::new(GitlabClient::new(user.gitlab_url.as_deref().unwrap_or(""))),
            user.gitlab_token.as_deref(),
        ),
    };

    let encrypted = encrypted.filter(|t| !t.is_empty()).ok_or_else(|| {
        AppError::InvalidInput(format!("no {} token configured", provider))
    })?;
    let token = cipher.decrypt(encrypted)?;

    client
        .validate_access(&owner, &name, &token)
        .await
        .map_err(|e| AppError::Upstream(format!("repository validation failed: {}", e)))?;

    let repo = db::repositories::create(&db, auth.user_id, &owner, &name, provider, &body.url)
        .await?;

    Ok(HttpResponse::Created().json(RepositoryResponse::from(repo)))
}

#[delete("/repositories/{id}")]
pub async fn remove(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    db::repositories::delete(&db, auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "repository removed" })))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(add).service(remove);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_url() {
        let (owner, name, provider) = parse_repo_url("https://github.com/acme/worklog").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(name, "worklog");
        assert_eq!(provider, Provider::Github);
    }

    #[test]
    fn test_parse_trims_git_suffix() {
        let (_, name, _) = parse_repo_url("https://github.com/acme/worklog.git").unwrap();
        assert_eq!(name, "worklog");
    }

    #[test]
    fn test_parse_gitlab_subgroup() {
        let (owner, name, provider) =
            parse_repo_url("https://git.example.com/group/sub/repo").unwrap();
        assert_eq!(owner, "group");
        assert_eq!(name, "sub/repo");
        assert_eq!(provider, Provider::Gitlab);
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        assert!(parse_repo_url("git@github.com:acme/worklog.git").is_err());
        assert!(parse_repo_url("https://github.com/just-owner").is_err());
        assert!(parse_repo_url("https://github.com/").is_err());
    }
}
