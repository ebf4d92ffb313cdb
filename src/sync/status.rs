//! Shared sync status and run-exclusion flags.
//!
//! Status maps are read by HTTP handlers while the background loops write
//! them, so access goes through a coarse read/write lock.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::sync::{SyncInfo, SyncState};

/// Per-user sync status for both sync kinds.
#[derive(Default)]
pub struct SyncStatus {
    commits: RwLock<HashMap<Uuid, SyncInfo>>,
    issues: RwLock<HashMap<Uuid, SyncInfo>>,
}

impl SyncStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit_status(&self, user_id: Uuid) -> SyncInfo {
        read_entry(&self.commits, user_id)
    }

    pub fn issue_status(&self, user_id: Uuid) -> SyncInfo {
        read_entry(&self.issues, user_id)
    }

    pub fn set_commit_syncing(&self, user_id: Uuid) {
        set_syncing(&self.commits, user_id);
    }

    pub fn set_commit_done(
        &self,
        user_id: Uuid,
        next_sync: DateTime<Utc>,
        error: Option<String>,
    ) {
        set_done(&self.commits, user_id, next_sync, error);
    }

    pub fn set_issue_syncing(&self, user_id: Uuid) {
        set_syncing(&self.issues, user_id);
    }

    pub fn set_issue_done(&self, user_id: Uuid, next_sync: DateTime<Utc>, error: Option<String>) {
        set_done(&self.issues, user_id, next_sync, error);
    }
}

fn read_entry(map: &RwLock<HashMap<Uuid, SyncInfo>>, user_id: Uuid) -> SyncInfo {
    map.read()
        .map(|m| m.get(&user_id).cloned().unwrap_or_default())
        .unwrap_or_default()
}

fn set_syncing(map: &RwLock<HashMap<Uuid, SyncInfo>>, user_id: Uuid) {
    if let Ok(mut m) = map.write() {
        m.entry(user_id).or_default().status = SyncState::Syncing;
    }
}

fn set_done(
    map: &RwLock<HashMap<Uuid, SyncInfo>>,
    user_id: Uuid,
    next_sync: DateTime<Utc>,
    error: Option<String>,
) {
    if let Ok(mut m) = map.write() {
        let info = m.entry(user_id).or_default();
        info.last_sync = Some(Utc::now());
        info.next_sync = Some(next_sync);
        info.status = SyncState::Idle;
        info.last_error = error;
    }
}

/// Compare-and-set guard for one run kind.
///
/// A run that fails to acquire the flag is skipped entirely, never queued.
#[derive(Default)]
pub struct RunFlag(AtomicBool);

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the flag. Returns false when a run is already active.
    pub fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flag_mutual_exclusion() {
        let flag = RunFlag::new();
        assert!(flag.try_acquire());
        // Second run is skipped while the first holds the flag.
        assert!(!flag.try_acquire());
        flag.release();
        assert!(flag.try_acquire());
    }

    #[test]
    fn test_status_defaults_to_idle() {
        let status = SyncStatus::new();
        let info = status.commit_status(Uuid::new_v4());
        assert_eq!(info.status, SyncState::Idle);
        assert!(info.last_sync.is_none());
        assert!(info.last_error.is_none());
    }

    #[test]
    fn test_skipped_run_leaves_status_untouched() {
        let status = SyncStatus::new();
        let user = Uuid::new_v4();
        let next = Utc::now();
        status.set_commit_done(user, next, None);
        let before = status.commit_status(user);

        let flag = RunFlag::new();
        assert!(flag.try_acquire());
        if flag.try_acquire() {
            // Would run a second sync; never reached.
            status.set_commit_done(user, Utc::now(), None);
        }

        let after = status.commit_status(user);
        assert_eq!(before.last_sync, after.last_sync);
    }

    #[test]
    fn test_done_records_error_and_clears_it() {
        let status = SyncStatus::new();
        let user = Uuid::new_v4();
        let next = Utc::now();

        status.set_issue_syncing(user);
        assert_eq!(status.issue_status(user).status, SyncState::Syncing);

        status.set_issue_done(user, next, Some("boom".to_string()));
        let info = status.issue_status(user);
        assert_eq!(info.status, SyncState::Idle);
        assert_eq!(info.last_error.as_deref(), Some("boom"));

        status.set_issue_done(user, next, None);
        assert!(status.issue_status(user).last_error.is_none());
    }
}
