//! Source-control provider clients behind one capability trait.
//!
//! Two REST flavors (GitHub-like, GitLab-like) are selected at runtime from
//! the provider enum stored on each repository.

pub mod github;
pub mod gitlab;

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::warn;

pub use github::GithubClient;
pub use gitlab::GitlabClient;

/// Upstream page size for branch and commit listings.
pub const PAGE_SIZE: usize = 100;

/// HTTP connect timeout for upstream API calls.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// HTTP total timeout for upstream API calls.
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A commit as reported by an upstream provider.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub branch: String,
    pub date: DateTime<Utc>,
}

/// Errors from upstream source-control APIs. All are terminal for the
/// affected fetch.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unauthorized: invalid token")]
    Unauthorized,

    #[error("repository not found")]
    NotFound,

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Capability shared by all source-control providers.
#[async_trait]
pub trait CommitProvider: Send + Sync {
    async fn fetch_branches(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<String>, ProviderError>;

    async fn fetch_branch_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        token: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ProviderError>;

    async fn validate_access(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<(), ProviderError>;

    /// Union of per-branch fetches, deduplicated by SHA.
    ///
    /// First-seen wins: a commit reachable from several branches is credited
    /// to whichever branch the provider listed first. A failure on one
    /// branch skips that branch and keeps going; failure to list branches
    /// aborts the whole fetch.
    async fn fetch_commits(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ProviderError> {
        let branches = self.fetch_branches(owner, repo, token).await?;

        let mut seen = HashSet::new();
        let mut all = Vec::new();

        for branch in branches {
            match self
                .fetch_branch_commits(owner, repo, &branch, token, since)
                .await
            {
                Ok(commits) => {
                    for ci in commits {
                        if seen.insert(ci.sha.clone()) {
                            all.push(ci);
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "skipping branch {} of {}/{}: {}",
                        branch, owner, repo, e
                    );
                }
            }
        }

        Ok(all)
    }
}

/// Shared HTTP client with timeouts for provider calls.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client for provider")
}

static ISSUE_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][A-Z0-9]+-\d+)").expect("issue key regex"));

/// Extract an issue key (e.g. `PDT-123`) from a commit message.
///
/// Only the first line is scanned.
pub fn extract_issue_key(message: &str) -> Option<String> {
    let first_line = message.split('\n').next().unwrap_or("");
    ISSUE_KEY_REGEX
        .find(first_line)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_key_at_start() {
        assert_eq!(
            extract_issue_key("PDT-123: fix bug").as_deref(),
            Some("PDT-123")
        );
    }

    #[test]
    fn test_extract_key_mid_line() {
        assert_eq!(
            extract_issue_key("fix bug for CORE-42 properly").as_deref(),
            Some("CORE-42")
        );
    }

    #[test]
    fn test_no_key() {
        assert_eq!(extract_issue_key("no ticket here"), None);
    }

    #[test]
    fn test_lowercase_rejected() {
        assert_eq!(extract_issue_key("lowercase pdt-123"), None);
    }

    #[test]
    fn test_only_first_line_scanned() {
        assert_eq!(extract_issue_key("first line\nPDT-99"), None);
    }

    #[test]
    fn test_single_letter_project_rejected() {
        // Pattern requires at least two leading characters before the dash.
        assert_eq!(extract_issue_key("A-1 quick fix"), None);
        assert_eq!(extract_issue_key("AB-1 quick fix").as_deref(), Some("AB-1"));
    }

    struct FakeProvider;

    #[async_trait]
    impl CommitProvider for FakeProvider {
        async fn fetch_branches(
            &self,
            _owner: &str,
            _repo: &str,
            _token: &str,
        ) -> Result<Vec<String>, ProviderError> {
            Ok(vec![
                "main".to_string(),
                "broken".to_string(),
                "feature".to_string(),
            ])
        }

        async fn fetch_branch_commits(
            &self,
            _owner: &str,
            _repo: &str,
            branch: &str,
            _token: &str,
            _since: DateTime<Utc>,
        ) -> Result<Vec<CommitInfo>, ProviderError> {
            let commit = |sha: &str, branch: &str| CommitInfo {
                sha: sha.to_string(),
                message: "msg".to_string(),
                author: "dev".to_string(),
                author_email: "dev@example.com".to_string(),
                branch: branch.to_string(),
                date: Utc::now(),
            };
            match branch {
                "main" => Ok(vec![commit("aaa", "main"), commit("bbb", "main")]),
                "feature" => Ok(vec![commit("bbb", "feature"), commit("ccc", "feature")]),
                _ => Err(ProviderError::UnexpectedStatus(500)),
            }
        }

        async fn validate_access(
            &self,
            _owner: &str,
            _repo: &str,
            _token: &str,
        ) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fetch_commits_dedups_and_survives_branch_failure() {
        let provider = FakeProvider;
        let commits = provider
            .fetch_commits("o", "r", "t", Utc::now())
            .await
            .unwrap();

        let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["aaa", "bbb", "ccc"]);

        // First-seen branch wins for the shared commit.
        let shared = commits.iter().find(|c| c.sha == "bbb").unwrap();
        assert_eq!(shared.branch, "main");
    }
}
