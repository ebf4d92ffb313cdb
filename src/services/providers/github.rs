//! GitHub REST API client.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use super::{CommitInfo, CommitProvider, PAGE_SIZE, ProviderError, build_http_client};

const BASE_URL: &str = "https://api.github.com";

pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct GithubBranch {
    name: String,
}

#[derive(Deserialize)]
struct GithubCommit {
    sha: String,
    commit: GithubCommitInner,
}

#[derive(Deserialize)]
struct GithubCommitInner {
    message: String,
    author: GithubCommitAuthor,
}

#[derive(Deserialize)]
struct GithubCommitAuthor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    date: DateTime<Utc>,
}

impl GithubClient {
    pub fn new() -> Self {
        GithubClient {
            http: build_http_client(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Client against a custom endpoint (GitHub Enterprise, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        GithubClient {
            http: build_http_client(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, ProviderError> {
        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "worklog-server")
            .send()
            .await?;

        match resp.status().as_u16() {
            200 => Ok(resp.json::<T>().await?),
            401 => Err(ProviderError::Unauthorized),
            404 => Err(ProviderError::NotFound),
            status => Err(ProviderError::UnexpectedStatus(status)),
        }
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommitProvider for GithubClient {
    async fn fetch_branches(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/repos/{}/{}/branches?per_page={}&page={}",
                self.base_url, owner, repo, PAGE_SIZE, page
            );
            let branches: Vec<GithubBranch> = self.get_json(&url, token).await?;
            let count = branches.len();

            all.extend(branches.into_iter().map(|b| b.name));

            // A short page means we have seen the last one.
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    async fn fetch_branch_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        token: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitInfo>, ProviderError> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/repos/{}/{}/commits?sha={}&since={}&per_page={}&page={}",
                self.base_url, owner, repo, branch, since, PAGE_SIZE, page
            );
            let commits: Vec<GithubCommit> = self.get_json(&url, token).await?;
            let count = commits.len();

            all.extend(commits.into_iter().map(|gc| CommitInfo {
                sha: gc.sha,
                message: gc.commit.message,
                author: gc.commit.author.name,
                author_email: gc.commit.author.email,
                branch: branch.to_string(),
                date: gc.commit.author.date,
            }));

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    async fn validate_access(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        self.get_json::<serde_json::Value>(&url, token).await?;
        Ok(())
    }
}
