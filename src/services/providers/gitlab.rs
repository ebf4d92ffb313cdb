//! GitLab REST API client (gitlab.com or self-hosted).

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use super::{CommitInfo, CommitProvider, PAGE_SIZE, ProviderError, build_http_client};

const DEFAULT_BASE_URL: &str = "https://gitlab.com";

pub struct GitlabClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct GitlabBranch {
    name: String,
}

#[derive(Deserialize)]
struct GitlabCommit {
    id: String,
    message: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    author_email: String,
    authored_date: DateTime<Utc>,
}

impl GitlabClient {
    /// Empty base URL falls back to gitlab.com.
    pub fn new(base_url: &str) -> Self {
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim_end_matches('/').to_string()
        };
        GitlabClient {
            http: build_http_client(),
            base_url,
        }
    }

    /// Project path segment, URL-escaped ("owner/repo" -> "owner%2Frepo").
    fn project_path(owner: &str, repo: &str) -> String {
        urlencoding::encode(&format!("{}/{}", owner, repo)).into_owned()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, ProviderError> {
        let resp = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", token)
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

#[async_trait]
impl CommitProvider for GitlabClient {
    async fn fetch_branches(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let project = Self::project_path(owner, repo);
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/api/v4/projects/{}/repository/branches?per_page={}&page={}",
                self.base_url, project, PAGE_SIZE, page
            );
            let branches: Vec<GitlabBranch> = self.get_json(&url, token).await?;
            let count = branches.len();

            all.extend(branches.into_iter().map(|b| b.name));

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
        let project = Self::project_path(owner, repo);
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/api/v4/projects/{}/repository/commits?ref_name={}&since={}&per_page={}&page={}",
                self.base_url,
                project,
                urlencoding::encode(branch),
                since,
                PAGE_SIZE,
                page
            );
            let commits: Vec<GitlabCommit> = self.get_json(&url, token).await?;
            let count = commits.len();

            all.extend(commits.into_iter().map(|gc| CommitInfo {
                sha: gc.id,
                message: gc.message,
                author: gc.author_name,
                author_email: gc.author_email,
                branch: branch.to_string(),
                date: gc.authored_date,
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
        let url = format!(
            "{}/api/v4/projects/{}",
            self.base_url,
            Self::project_path(owner, repo)
        );
        self.get_json::<serde_json::Value>(&url, token).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path_escapes_slash() {
        assert_eq!(GitlabClient::project_path("group", "repo"), "group%2Frepo");
    }

    #[test]
    fn test_empty_base_url_defaults() {
        let client = GitlabClient::new("");
        assert_eq!(client.base_url, "https://gitlab.com");
        let client = GitlabClient::new("https://git.example.com/");
        assert_eq!(client.base_url, "https://git.example.com");
    }
}
