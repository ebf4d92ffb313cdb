//! Sync status and per-repository result types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Whether a sync kind is currently running for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Per-user status for one sync kind.
#[derive(Debug, Clone, Serialize)]
pub struct SyncInfo {
    pub last_sync: Option<DateTime<Utc>>,
    pub next_sync: Option<DateTime<Utc>>,
    pub status: SyncState,
    pub last_error: Option<String>,
}

impl Default for SyncInfo {
    fn default() -> Self {
        SyncInfo {
            last_sync: None,
            next_sync: None,
            status: SyncState::Idle,
            last_error: None,
        }
    }
}

/// Outcome of syncing one tracked repository.
///
/// `error` is populated for per-repository failures; the sync operation
/// itself still succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct CommitSyncResult {
    pub repo_id: Uuid,
    pub repo_name: String,
    pub provider: String,
    pub new_commits: usize,
    pub total_fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommitSyncResult {
    pub fn new(repo_id: Uuid, repo_name: String, provider: String) -> Self {
        CommitSyncResult {
            repo_id,
            repo_name,
            provider,
            new_commits: 0,
            total_fetched: 0,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
