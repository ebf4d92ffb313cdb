//! Jira-style issue tracker client.
//!
//! Every request authenticates with basic auth from an email + API token
//! pair that the caller decrypts just in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::providers::build_http_client;

/// Upper bound on issues returned per sprint listing.
const SPRINT_ISSUES_MAX: usize = 200;

/// Errors from the issue-tracker API.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Covers both 401 and 403; upstream uses them interchangeably.
    #[error("unauthorized: invalid tracker credentials")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A sprint as listed by the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct SprintInfo {
    pub id: i64,
    pub name: String,
    pub state: String,
    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
}

/// A card as listed inside a sprint.
#[derive(Debug, Clone)]
pub struct CardInfo {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
}

/// Full issue detail, cached as JSON on the card row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetail {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub issue_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueRef>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub subtasks: Vec<IssueRef>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub changelog: Vec<ChangeHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRef {
    pub key: String,
    pub summary: String,
    pub status: String,
    #[serde(rename = "type")]
    pub issue_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeHistory {
    pub author: String,
    pub created: String,
    pub items: Vec<ChangeItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeItem {
    pub field: String,
    pub from_string: String,
    pub to_string: String,
}

// Raw upstream response shapes.

#[derive(Deserialize)]
struct BoardResponse {
    #[serde(default)]
    values: Vec<BoardEntry>,
}

#[derive(Deserialize)]
struct BoardEntry {
    id: i64,
}

#[derive(Deserialize)]
struct SprintResponse {
    #[serde(default)]
    values: Vec<SprintInfo>,
}

#[derive(Deserialize)]
struct IssueListResponse {
    #[serde(default)]
    issues: Vec<RawIssueSummary>,
}

#[derive(Deserialize)]
struct RawIssueSummary {
    key: String,
    fields: RawSummaryFields,
}

#[derive(Deserialize)]
struct RawSummaryFields {
    #[serde(default)]
    summary: String,
    status: RawNamed,
    assignee: Option<RawDisplayNamed>,
}

#[derive(Deserialize)]
struct RawNamed {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct RawDisplayNamed {
    #[serde(rename = "displayName", default)]
    display_name: String,
}

#[derive(Deserialize)]
struct RawIssueDetail {
    key: String,
    fields: RawDetailFields,
    #[serde(default)]
    changelog: RawChangelog,
}

#[derive(Deserialize)]
struct RawDetailFields {
    #[serde(default)]
    summary: String,
    status: RawNamed,
    assignee: Option<RawDisplayNamed>,
    issuetype: RawNamed,
    parent: Option<RawIssueRef>,
    #[serde(default)]
    subtasks: Vec<RawIssueRef>,
}

#[derive(Deserialize)]
struct RawIssueRef {
    key: String,
    fields: RawRefFields,
}

#[derive(Deserialize)]
struct RawRefFields {
    #[serde(default)]
    summary: String,
    status: RawNamed,
    issuetype: RawNamed,
}

#[derive(Deserialize, Default)]
struct RawChangelog {
    #[serde(default)]
    histories: Vec<RawHistory>,
}

#[derive(Deserialize)]
struct RawHistory {
    author: RawDisplayNamed,
    #[serde(default)]
    created: String,
    #[serde(default)]
    items: Vec<RawChangeItem>,
}

#[derive(Deserialize)]
struct RawChangeItem {
    #[serde(default)]
    field: String,
    #[serde(rename = "fromString")]
    from_string: Option<String>,
    #[serde(rename = "toString")]
    to_string: Option<String>,
}

pub struct JiraClient {
    http: reqwest::Client,
    workspace: String,
    email: String,
    token: String,
}

impl JiraClient {
    pub fn new(workspace: &str, email: &str, token: &str) -> Self {
        JiraClient {
            http: build_http_client(),
            workspace: workspace.to_string(),
            email: email.to_string(),
            token: token.to_string(),
        }
    }

    fn base_url(&self) -> String {
        format!("https://{}/rest", self.workspace)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, TrackerError> {
        let resp = self
            .http
            .get(url)
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        match resp.status().as_u16() {
            200 => Ok(resp.json::<T>().await?),
            401 | 403 => Err(TrackerError::Unauthorized),
            404 => Err(TrackerError::NotFound),
            status => Err(TrackerError::UnexpectedStatus(status)),
        }
    }

    /// IDs of all boards visible to the credentials.
    pub async fn fetch_boards(&self) -> Result<Vec<i64>, TrackerError> {
        let url = format!("{}/agile/1.0/board", self.base_url());
        let resp: BoardResponse = self.get_json(&url).await?;
        Ok(resp.values.into_iter().map(|b| b.id).collect())
    }

    pub async fn fetch_sprints(&self, board_id: i64) -> Result<Vec<SprintInfo>, TrackerError> {
        let url = format!("{}/agile/1.0/board/{}/sprint", self.base_url(), board_id);
        let resp: SprintResponse = self.get_json(&url).await?;
        Ok(resp.values)
    }

    pub async fn fetch_sprint_issues(
        &self,
        sprint_id: i64,
    ) -> Result<Vec<CardInfo>, TrackerError> {
        let url = format!(
            "{}/agile/1.0/sprint/{}/issue?maxResults={}",
            self.base_url(),
            sprint_id,
            SPRINT_ISSUES_MAX
        );
        let resp: IssueListResponse = self.get_json(&url).await?;

        Ok(resp
            .issues
            .into_iter()
            .map(|issue| CardInfo {
                key: issue.key,
                summary: issue.fields.summary,
                status: issue.fields.status.name,
                assignee: issue
                    .fields
                    .assignee
                    .map(|a| a.display_name)
                    .unwrap_or_default(),
            })
            .collect())
    }

    /// Single-issue detail including parent, subtasks and changelog.
    pub async fn fetch_issue(&self, key: &str) -> Result<IssueDetail, TrackerError> {
        let url = format!(
            "{}/api/2/issue/{}?fields=summary,status,assignee,parent,subtasks,issuetype&expand=changelog",
            self.base_url(),
            key
        );
        let raw: RawIssueDetail = self.get_json(&url).await?;
        Ok(Self::detail_from_raw(raw))
    }

    /// Probe the credentials without touching any board.
    pub async fn validate(&self) -> Result<(), TrackerError> {
        let url = format!("{}/api/2/myself", self.base_url());
        self.get_json::<serde_json::Value>(&url).await?;
        Ok(())
    }

    fn detail_from_raw(raw: RawIssueDetail) -> IssueDetail {
        let ref_from_raw = |r: RawIssueRef| IssueRef {
            key: r.key,
            summary: r.fields.summary,
            status: r.fields.status.name,
            issue_type: r.fields.issuetype.name,
        };

        IssueDetail {
            key: raw.key,
            summary: raw.fields.summary,
            status: raw.fields.status.name,
            assignee: raw
                .fields
                .assignee
                .map(|a| a.display_name)
                .unwrap_or_default(),
            issue_type: raw.fields.issuetype.name,
            parent: raw.fields.parent.map(ref_from_raw),
            subtasks: raw.fields.subtasks.into_iter().map(ref_from_raw).collect(),
            changelog: raw
                .changelog
                .histories
                .into_iter()
                .map(|h| ChangeHistory {
                    author: h.author.display_name,
                    created: h.created,
                    items: h
                        .items
                        .into_iter()
                        .map(|i| ChangeItem {
                            field: i.field,
                            from_string: i.from_string.unwrap_or_default(),
                            to_string: i.to_string.unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Check a card key against a comma-separated list of project key prefixes.
///
/// An empty filter passes everything. A prefix matches only when followed by
/// a dash, so "PDT" does not match "PDTX-1".
pub fn filter_by_project_keys(card_key: &str, project_keys: &str) -> bool {
    if project_keys.is_empty() {
        return true;
    }
    project_keys.split(',').any(|k| {
        let trimmed = k.trim();
        !trimmed.is_empty() && card_key.starts_with(&format!("{}-", trimmed))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_empty_passes_all() {
        assert!(filter_by_project_keys("PDT-123", ""));
        assert!(filter_by_project_keys("", ""));
    }

    #[test]
    fn test_filter_matches_any_prefix() {
        assert!(filter_by_project_keys("PDT-123", "PDT,CORE"));
        assert!(filter_by_project_keys("CORE-7", "PDT,CORE"));
        assert!(!filter_by_project_keys("OTHER-1", "PDT,CORE"));
    }

    #[test]
    fn test_filter_prefix_requires_dash() {
        assert!(!filter_by_project_keys("PDTX-1", "PDT"));
        assert!(!filter_by_project_keys("PDT", "PDT"));
    }

    #[test]
    fn test_filter_trims_whitespace() {
        assert!(filter_by_project_keys("CORE-1", " PDT , CORE "));
    }

    #[test]
    fn test_parse_sprint_listing() {
        let body = r#"{"values":[
            {"id":41,"name":"Sprint 7","state":"active",
             "startDate":"2026-08-17T00:00:00.000Z","endDate":"2026-08-31T00:00:00.000Z"},
            {"id":42,"name":"Sprint 8","state":"future","startDate":null,"endDate":null}
        ]}"#;
        let resp: SprintResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.values.len(), 2);
        assert_eq!(resp.values[0].id, 41);
        assert_eq!(resp.values[0].state, "active");
        assert!(resp.values[0].start_date.is_some());
        assert!(resp.values[1].start_date.is_none());
    }

    #[test]
    fn test_parse_issue_detail() {
        let body = r#"{
            "key":"PDT-10",
            "fields":{
                "summary":"Wire up report uploads",
                "status":{"name":"In Progress"},
                "assignee":{"displayName":"Dana"},
                "issuetype":{"name":"Story"},
                "parent":{"key":"PDT-1","fields":{
                    "summary":"Reports epic","status":{"name":"Open"},"issuetype":{"name":"Epic"}}},
                "subtasks":[{"key":"PDT-11","fields":{
                    "summary":"Render","status":{"name":"Done"},"issuetype":{"name":"Sub-task"}}}]
            },
            "changelog":{"histories":[{
                "author":{"displayName":"Dana"},
                "created":"2026-08-20T09:00:00.000Z",
                "items":[{"field":"status","fromString":"Open","toString":"In Progress"}]
            }]}
        }"#;
        let raw: RawIssueDetail = serde_json::from_str(body).unwrap();
        let detail = JiraClient::detail_from_raw(raw);

        assert_eq!(detail.key, "PDT-10");
        assert_eq!(detail.assignee, "Dana");
        assert_eq!(detail.parent.as_ref().unwrap().key, "PDT-1");
        assert_eq!(detail.subtasks.len(), 1);
        assert_eq!(detail.changelog[0].items[0].to_string, "In Progress");
    }

    #[test]
    fn test_parse_issue_detail_minimal() {
        let body = r#"{
            "key":"PDT-2",
            "fields":{
                "summary":"Small fix",
                "status":{"name":"Done"},
                "assignee":null,
                "issuetype":{"name":"Bug"}
            }
        }"#;
        let raw: RawIssueDetail = serde_json::from_str(body).unwrap();
        let detail = JiraClient::detail_from_raw(raw);

        assert_eq!(detail.assignee, "");
        assert!(detail.parent.is_none());
        assert!(detail.subtasks.is_empty());
        assert!(detail.changelog.is_empty());
    }
}
