//! Background sync scheduler.
//!
//! Three independent loops: commit sync, issue sync and an optional daily
//! report check. Each loop runs once immediately, then on its fixed
//! interval, and stops on the shutdown signal. A compare-and-set flag per
//! kind skips a run outright when the previous one is still going.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

use crate::config::SyncSettings;
use crate::crypto::TokenCipher;
use crate::db;
use crate::services::storage::Storage;
use crate::sync::status::{RunFlag, SyncStatus};
use crate::sync::{commits, issues, reports};

/// How often the report loop checks the wall clock.
const REPORT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

pub struct Scheduler {
    db: DatabaseConnection,
    cipher: TokenCipher,
    storage: Option<Storage>,
    settings: SyncSettings,
    pub status: Arc<SyncStatus>,
    commit_running: RunFlag,
    issue_running: RunFlag,
    report_running: RunFlag,
    /// Last calendar date the daily report run fired for. In-memory only;
    /// a restart near the trigger time can repeat or miss that day's run.
    last_report_date: Mutex<String>,
}

impl Scheduler {
    pub fn new(
        db: DatabaseConnection,
        cipher: TokenCipher,
        storage: Option<Storage>,
        settings: SyncSettings,
        status: Arc<SyncStatus>,
    ) -> Self {
        Scheduler {
            db,
            cipher,
            storage,
            settings,
            status,
            commit_running: RunFlag::new(),
            issue_running: RunFlag::new(),
            report_running: RunFlag::new(),
            last_report_date: Mutex::new(String::new()),
        }
    }

    /// Spawn the background loops.
    pub fn start(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        info!(
            "starting scheduler: commits every {:?}, issues every {:?}, reports={} at {}",
            self.settings.commit_interval,
            self.settings.issue_interval,
            self.settings.report_auto_generate,
            self.settings.report_auto_time
        );

        {
            let s = Arc::clone(&self);
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut ticker = interval(s.settings.commit_interval);
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            info!("commit sync loop stopped");
                            return;
                        }
                        _ = ticker.tick() => s.run_commit_sync().await,
                    }
                }
            });
        }

        {
            let s = Arc::clone(&self);
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut ticker = interval(s.settings.issue_interval);
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            info!("issue sync loop stopped");
                            return;
                        }
                        _ = ticker.tick() => s.run_issue_sync().await,
                    }
                }
            });
        }

        if self.settings.report_auto_generate {
            let s = Arc::clone(&self);
            let mut shutdown = shutdown;
            tokio::spawn(async move {
                let mut ticker = interval(REPORT_CHECK_INTERVAL);
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => {
                            info!("report loop stopped");
                            return;
                        }
                        _ = ticker.tick() => s.check_and_generate_reports().await,
                    }
                }
            });
        }
    }

    async fn run_commit_sync(&self) {
        if !self.commit_running.try_acquire() {
            info!("commit sync skipped: previous run still in progress");
            return;
        }

        info!("commit sync starting");

        let user_ids = match db::repositories::distinct_user_ids(&self.db).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("commit sync aborted: {}", e);
                self.commit_running.release();
                return;
            }
        };

        let next_sync = Utc::now()
            + chrono::Duration::from_std(self.settings.commit_interval)
                .unwrap_or_else(|_| chrono::Duration::seconds(0));

        for uid in user_ids {
            self.status.set_commit_syncing(uid);
            match commits::sync_user_commits(&self.db, &self.cipher, uid).await {
                Ok(results) => {
                    for r in results.unwrap_or_default() {
                        if let Some(err) = &r.error {
                            warn!("commit sync user={} repo={}: {}", uid, r.repo_name, err);
                        } else if r.new_commits > 0 {
                            info!(
                                "commit sync user={} repo={} new={} total={}",
                                uid, r.repo_name, r.new_commits, r.total_fetched
                            );
                        }
                    }
                    self.status.set_commit_done(uid, next_sync, None);
                }
                Err(e) => {
                    warn!("commit sync failed for user {}: {}", uid, e);
                    self.status.set_commit_done(uid, next_sync, Some(e.to_string()));
                }
            }
        }

        info!("commit sync completed");
        self.commit_running.release();
    }

    async fn run_issue_sync(&self) {
        if !self.issue_running.try_acquire() {
            info!("issue sync skipped: previous run still in progress");
            return;
        }

        info!("issue sync starting");

        let users = match db::users::list_with_tracker_credentials(&self.db).await {
            Ok(users) => users,
            Err(e) => {
                warn!("issue sync aborted: {}", e);
                self.issue_running.release();
                return;
            }
        };

        let next_sync = Utc::now()
            + chrono::Duration::from_std(self.settings.issue_interval)
                .unwrap_or_else(|_| chrono::Duration::seconds(0));

        for user in users {
            self.status.set_issue_syncing(user.id);
            match issues::sync_user_issues(&self.db, &self.cipher, user.id).await {
                Ok(()) => {
                    info!("issue sync completed for {}", user.email);
                    self.status.set_issue_done(user.id, next_sync, None);
                }
                Err(e) => {
                    warn!("issue sync failed for {}: {}", user.email, e);
                    self.status.set_issue_done(user.id, next_sync, Some(e.to_string()));
                }
            }
        }

        info!("issue sync completed");
        self.issue_running.release();
    }

    /// Fire the daily report run at most once per calendar day, once the
    /// local wall clock passes the configured trigger time.
    async fn check_and_generate_reports(&self) {
        let now = Local::now();
        let today = now.format("%Y-%m-%d").to_string();

        {
            let last = match self.last_report_date.lock() {
                Ok(last) => last,
                Err(_) => return,
            };
            if *last == today {
                return;
            }
        }

        let current_time = now.format("%H:%M").to_string();
        if current_time < self.settings.report_auto_time {
            return;
        }

        if !self.report_running.try_acquire() {
            return;
        }

        info!("auto-generating daily reports");
        if let Err(e) =
            reports::auto_generate_reports(&self.db, &self.cipher, self.storage.as_ref()).await
        {
            warn!("daily report generation failed: {}", e);
        }
        // The day is consumed even when the run errored; a failed run does
        // not retry until the next calendar day.
        if let Ok(mut last) = self.last_report_date.lock() {
            *last = today;
        }
        info!("daily report generation completed");

        self.report_running.release();
    }
}
