//! Database module providing connection management and queries.
//!
//! Query functions are free `async fn`s over `&DatabaseConnection`, grouped
//! per aggregate.

pub mod commits;
pub mod jira;
pub mod reports;
pub mod repositories;
pub mod templates;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::{AppError, AppResult};

/// Open a connection pool to the configured database.
pub async fn connect(database_url: &str) -> AppResult<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.max_connections(10)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(opts)
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))
}
