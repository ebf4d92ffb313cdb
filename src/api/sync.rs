//! On-demand sync triggers and status reads.

use actix_web::{HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::auth::AuthedUser;
use crate::crypto::TokenCipher;
use crate::error::AppResult;
use crate::models::{CommitSyncResult, SyncInfo};
use crate::sync::{SyncStatus, commits, issues};

#[derive(Debug, Serialize)]
pub struct SyncCommitsResponse {
    pub message: Option<String>,
    pub results: Vec<CommitSyncResult>,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub commits: SyncInfo,
    pub issues: SyncInfo,
}

#[post("/sync/commits")]
pub async fn sync_commits(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    cipher: web::Data<TokenCipher>,
) -> AppResult<HttpResponse> {
    let results = commits::sync_user_commits(&db, &cipher, auth.user_id).await?;

    let response = match results {
        Some(results) => SyncCommitsResponse {
            message: None,
            results,
        },
        None => SyncCommitsResponse {
            message: Some("no repositories to sync".to_string()),
            results: Vec::new(),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

#[post("/sync/issues")]
pub async fn sync_issues(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    cipher: web::Data<TokenCipher>,
) -> AppResult<HttpResponse> {
    issues::sync_user_issues(&db, &cipher, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "issue sync completed" })))
}

#[get("/sync/status")]
pub async fn sync_status(auth: AuthedUser, status: web::Data<SyncStatus>) -> HttpResponse {
    HttpResponse::Ok().json(SyncStatusResponse {
        commits: status.commit_status(auth.user_id),
        issues: status.issue_status(auth.user_id),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(sync_commits).service(sync_issues).service(sync_status);
}
