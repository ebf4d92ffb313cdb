//! Issue-tracker synchronization.
//!
//! Mirrors boards -> sprints -> cards. Only active sprints get their issues
//! pulled; each of those issues is fetched in full so the card caches its
//! parent/subtask/changelog detail. Per-board and per-sprint failures are
//! logged and skipped.

use sea_orm::DatabaseConnection;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::TokenCipher;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::provider::SprintState;
use crate::services::jira::{JiraClient, filter_by_project_keys};

/// Sync sprints and cards for one user.
///
/// A user without a complete tracker configuration (token, workspace, email)
/// is a silent no-op.
pub async fn sync_user_issues(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    user_id: Uuid,
) -> AppResult<()> {
    let user = db::users::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let (Some(encrypted), Some(workspace), Some(email)) = (
        user.jira_token.as_deref().filter(|s| !s.is_empty()),
        user.jira_workspace.as_deref().filter(|s| !s.is_empty()),
        user.jira_email.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Ok(());
    };

    let token = cipher.decrypt(encrypted)?;
    let client = JiraClient::new(workspace, email, &token);
    let project_keys = user.jira_project_keys.as_deref().unwrap_or("");

    let boards = client
        .fetch_boards()
        .await
        .map_err(|e| AppError::Upstream(format!("failed to fetch boards: {}", e)))?;

    for board_id in boards {
        let sprints = match client.fetch_sprints(board_id).await {
            Ok(sprints) => sprints,
            Err(e) => {
                warn!("sprint fetch failed for board {}: {}", board_id, e);
                continue;
            }
        };

        for sprint_info in sprints {
            let state = SprintState::parse(&sprint_info.state);
            let sprint = db::jira::upsert_sprint(
                db,
                user_id,
                &sprint_info.id.to_string(),
                &sprint_info.name,
                state,
                sprint_info.start_date,
                sprint_info.end_date,
            )
            .await?;

            if state != SprintState::Active {
                continue;
            }

            let cards = match client.fetch_sprint_issues(sprint_info.id).await {
                Ok(cards) => cards,
                Err(e) => {
                    warn!("issue fetch failed for sprint {}: {}", sprint_info.id, e);
                    continue;
                }
            };

            for card in cards {
                if !filter_by_project_keys(&card.key, project_keys) {
                    continue;
                }

                // Full detail is best-effort; the card is mirrored either way.
                let details_json = match client.fetch_issue(&card.key).await {
                    Ok(detail) => serde_json::to_string(&detail).ok(),
                    Err(e) => {
                        debug!("detail fetch failed for {}: {}", card.key, e);
                        None
                    }
                };

                db::jira::upsert_card(
                    db,
                    user_id,
                    &card.key,
                    &card.summary,
                    &card.status,
                    &card.assignee,
                    Some(sprint.id),
                    details_json,
                )
                .await?;
            }
        }
    }

    Ok(())
}
