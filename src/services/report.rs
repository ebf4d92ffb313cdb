//! Daily report generation.
//!
//! Aggregates a user's commits for one day, groups them by linked card and
//! renders markdown through a handlebars template. Card summaries come from
//! the local mirror first, with a live tracker fetch as fallback.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use handlebars::Handlebars;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::TokenCipher;
use crate::db;
use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::services::jira::JiraClient;

/// Built-in template used when the user has not configured one.
pub const DEFAULT_TEMPLATE: &str = r#"# Daily Report — {{date_formatted}}

**Author:** {{author}}

## Summary
- **Commits:** {{stats.total_commits}}
- **Jira Cards:** {{stats.total_cards}}
- **Repositories:** {{#each stats.repos}}{{#if @index}}, {{/if}}{{this}}{{/each}}

## Work Details
{{#each cards}}
### {{key}} — {{summary}}
**Status:** {{status}}
{{#each commits}}
- `{{sha}}` {{message}} ({{branch}}, {{time}})
{{/each}}
{{/each}}
{{#if unlinked_commits}}
## Other Commits
{{#each unlinked_commits}}
- `{{sha}}` {{message}} ({{repo}}/{{branch}}, {{time}})
{{/each}}
{{/if}}"#;

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub date: String,
    pub date_formatted: String,
    pub author: String,
    pub cards: Vec<CardReport>,
    pub unlinked_commits: Vec<CommitReport>,
    pub stats: ReportStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardReport {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub commits: Vec<CommitReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub sha: String,
    pub message: String,
    pub branch: String,
    pub repo: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportStats {
    pub total_commits: usize,
    pub total_cards: usize,
    pub repos: Vec<String>,
}

/// Aggregate one user's activity for `date` into renderable report data.
///
/// Cards are ordered by key; commits inside each card keep chronological
/// order. A card whose summary is unknown both locally and upstream still
/// appears, with empty summary and status.
pub async fn build_report_data(
    db: &DatabaseConnection,
    cipher: Option<&TokenCipher>,
    user: &user::Model,
    date: NaiveDate,
) -> AppResult<ReportData> {
    let day_start = Utc.from_utc_datetime(
        &date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::InvalidInput("invalid date".to_string()))?,
    );
    let day_end = day_start + Duration::hours(24);

    let rows = db::commits::list_for_user_in_range(db, user.id, day_start, day_end).await?;
    let total_commits = rows.len();

    let mut card_commits: BTreeMap<String, Vec<CommitReport>> = BTreeMap::new();
    let mut unlinked = Vec::new();
    let mut repo_set = BTreeSet::new();

    for (commit, repo) in rows {
        let repo_name = format!("{}/{}", repo.owner, repo.name);
        repo_set.insert(repo_name.clone());

        let cr = CommitReport {
            sha: short_sha(&commit.sha).to_string(),
            message: first_line(&commit.message),
            branch: commit.branch,
            repo: repo_name,
            time: commit.date.format("%H:%M").to_string(),
        };

        match commit.card_key {
            Some(key) if !key.is_empty() => card_commits.entry(key).or_default().push(cr),
            _ => unlinked.push(cr),
        }
    }

    // Live tracker fallback only when credentials decrypt cleanly.
    let jira_client = match cipher {
        Some(cipher) => tracker_client(cipher, user),
        None => None,
    };

    let mut cards = Vec::with_capacity(card_commits.len());
    for (key, commits) in card_commits {
        let mut card = CardReport {
            key: key.clone(),
            summary: String::new(),
            status: String::new(),
            commits,
        };

        if let Some(cached) = db::jira::find_card(db, user.id, &key).await? {
            card.summary = cached.summary;
            card.status = cached.status;
        } else if let Some(client) = &jira_client {
            match client.fetch_issue(&key).await {
                Ok(issue) => {
                    debug!("fetched card {} from tracker for report", key);
                    card.summary = issue.summary;
                    card.status = issue.status;
                }
                Err(e) => warn!("failed to fetch card {} for report: {}", key, e),
            }
        }

        cards.push(card);
    }

    Ok(ReportData {
        date: date.format("%Y-%m-%d").to_string(),
        date_formatted: date.format("%A, %d %B %Y").to_string(),
        author: user.email.clone(),
        stats: ReportStats {
            total_commits,
            total_cards: cards.len(),
            repos: repo_set.into_iter().collect(),
        },
        cards,
        unlinked_commits: unlinked,
    })
}

/// Render a template against report data.
///
/// Strict mode: a template referencing a field that does not exist fails
/// instead of rendering blanks.
pub fn render(template_content: &str, data: &ReportData) -> AppResult<String> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .render_template(template_content, data)
        .map_err(|e| AppError::Template(e.to_string()))
}

/// Resolve the template content for a report request.
///
/// Priority: explicitly requested template, then the user's flagged default,
/// then the built-in one. A requested ID that is missing or foreign falls
/// through rather than failing.
pub async fn resolve_template_content(
    db: &DatabaseConnection,
    user_id: Uuid,
    template_id: Option<Uuid>,
) -> AppResult<(String, Option<Uuid>)> {
    if let Some(id) = template_id
        && let Some(tmpl) = db::templates::find_owned(db, user_id, id).await?
    {
        return Ok((tmpl.content, Some(tmpl.id)));
    }

    if let Some(tmpl) = db::templates::find_default(db, user_id).await? {
        return Ok((tmpl.content, Some(tmpl.id)));
    }

    Ok((DEFAULT_TEMPLATE.to_string(), None))
}

fn tracker_client(cipher: &TokenCipher, user: &user::Model) -> Option<JiraClient> {
    let workspace = user.jira_workspace.as_deref().filter(|s| !s.is_empty())?;
    let email = user.jira_email.as_deref().filter(|s| !s.is_empty())?;
    let encrypted = user.jira_token.as_deref().filter(|s| !s.is_empty())?;

    match cipher.decrypt(encrypted) {
        Ok(token) => Some(JiraClient::new(workspace, email, &token)),
        Err(e) => {
            warn!("skipping tracker fallback for {}: {}", user.email, e);
            None
        }
    }
}

fn short_sha(sha: &str) -> &str {
    if sha.len() > 8 { &sha[..8] } else { sha }
}

/// First line of a commit message, capped at 80 characters.
fn first_line(msg: &str) -> String {
    let line = msg.split('\n').next().unwrap_or("");
    if line.chars().count() > 80 {
        let head: String = line.chars().take(77).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> ReportData {
        ReportData {
            date: "2026-08-29".to_string(),
            date_formatted: "Saturday, 29 August 2026".to_string(),
            author: "dev@example.com".to_string(),
            cards: vec![CardReport {
                key: "PDT-1".to_string(),
                summary: "Ship reports".to_string(),
                status: "In Progress".to_string(),
                commits: vec![CommitReport {
                    sha: "abcd1234".to_string(),
                    message: "PDT-1: wire renderer".to_string(),
                    branch: "main".to_string(),
                    repo: "acme/worklog".to_string(),
                    time: "09:30".to_string(),
                }],
            }],
            unlinked_commits: vec![CommitReport {
                sha: "feed5678".to_string(),
                message: "tidy imports".to_string(),
                branch: "main".to_string(),
                repo: "acme/worklog".to_string(),
                time: "10:02".to_string(),
            }],
            stats: ReportStats {
                total_commits: 2,
                total_cards: 1,
                repos: vec!["acme/worklog".to_string()],
            },
        }
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("abcdef1234567890"), "abcdef12");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn test_first_line_truncates() {
        assert_eq!(first_line("short msg\nbody"), "short msg");

        let long = "x".repeat(100);
        let capped = first_line(&long);
        assert_eq!(capped.len(), 80);
        assert!(capped.ends_with("..."));

        let exact = "y".repeat(80);
        assert_eq!(first_line(&exact), exact);
    }

    #[test]
    fn test_render_default_template() {
        let out = render(DEFAULT_TEMPLATE, &sample_data()).unwrap();
        assert!(out.contains("# Daily Report — Saturday, 29 August 2026"));
        assert!(out.contains("**Author:** dev@example.com"));
        assert!(out.contains("### PDT-1 — Ship reports"));
        assert!(out.contains("`abcd1234` PDT-1: wire renderer (main, 09:30)"));
        assert!(out.contains("## Other Commits"));
        assert!(out.contains("`feed5678` tidy imports (acme/worklog/main, 10:02)"));
    }

    #[test]
    fn test_render_empty_day() {
        let data = ReportData {
            cards: Vec::new(),
            unlinked_commits: Vec::new(),
            stats: ReportStats {
                total_commits: 0,
                total_cards: 0,
                repos: Vec::new(),
            },
            ..sample_data()
        };
        let out = render(DEFAULT_TEMPLATE, &data).unwrap();
        assert!(out.contains("- **Commits:** 0"));
        assert!(!out.contains("## Other Commits"));
    }

    #[test]
    fn test_render_unknown_field_fails() {
        let err = render("{{no_such_field}}", &sample_data()).unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
    }

    #[test]
    fn test_render_bad_syntax_fails() {
        let err = render("{{#each cards}}", &sample_data()).unwrap_err();
        assert!(matches!(err, AppError::Template(_)));
    }
}
