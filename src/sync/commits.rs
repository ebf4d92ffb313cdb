//! Commit synchronization.
//!
//! Every run re-scans a fixed 30-day lookback window; the SHA-unique insert
//! makes re-scanning idempotent. Per-repository failures are reported in the
//! result list and never abort sibling repositories.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;
use uuid::Uuid;

use crate::crypto::TokenCipher;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::Provider;
use crate::models::sync::CommitSyncResult;
use crate::services::providers::{
    CommitProvider, GithubClient, GitlabClient, extract_issue_key,
};

/// Trailing window re-scanned on every run.
const LOOKBACK_DAYS: i64 = 30;

/// Sync commits for every repository the user tracks.
///
/// Returns `None` when the user tracks no repositories, as distinct from an
/// empty result list.
pub async fn sync_user_commits(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    user_id: Uuid,
) -> AppResult<Option<Vec<CommitSyncResult>>> {
    let user = db::users::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let repos = db::repositories::list_for_user(db, user_id).await?;
    if repos.is_empty() {
        return Ok(None);
    }

    let since = Utc::now() - Duration::days(LOOKBACK_DAYS);
    let mut results = Vec::with_capacity(repos.len());

    for repo in repos {
        let result = CommitSyncResult::new(
            repo.id,
            format!("{}/{}", repo.owner, repo.name),
            repo.provider.clone(),
        );

        let Some(provider) = Provider::parse(&repo.provider) else {
            results.push(result.with_error(format!("unknown provider: {}", repo.provider)));
            continue;
        };

        let (client, encrypted): (Box<dyn CommitProvider>, Option<&str>) = match provider {
            Provider::Github => (
                Box::new(GithubClient::new()),
                user.github_token.as_deref(),
            ),
            Provider::Gitlab => (
                Box::new(GitlabClient::new(user.gitlab_url.as_deref().unwrap_or(""))),
                user.gitlab_token.as_deref(),
            ),
        };

        let Some(encrypted) = encrypted.filter(|t| !t.is_empty()) else {
            results.push(result.with_error(format!("no {} token configured", provider)));
            continue;
        };

        let token = match cipher.decrypt(encrypted) {
            Ok(token) => token,
            Err(_) => {
                results.push(result.with_error(format!("failed to decrypt {} token", provider)));
                continue;
            }
        };

        let commits = match client.fetch_commits(&repo.owner, &repo.name, &token, since).await {
            Ok(commits) => commits,
            Err(e) => {
                if let Err(db_err) = db::repositories::mark_invalid(db, repo).await {
                    warn!("failed to flag repository invalid: {}", db_err);
                }
                results.push(result.with_error(e.to_string()));
                continue;
            }
        };

        let mut result = result;
        result.total_fetched = commits.len();

        for ci in commits {
            let card_key = extract_issue_key(&ci.message);
            let inserted = db::commits::insert_if_new(
                db,
                db::commits::NewCommit {
                    repo_id: repo.id,
                    sha: ci.sha,
                    message: ci.message,
                    author: ci.author,
                    author_email: ci.author_email,
                    branch: ci.branch,
                    date: ci.date,
                    card_key,
                },
            )
            .await?;
            if inserted {
                result.new_commits += 1;
            }
        }

        db::repositories::mark_synced(db, repo).await?;
        results.push(result);
    }

    Ok(Some(results))
}
