//! Automatic daily report generation.

use chrono::{Local, NaiveDate};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::crypto::TokenCipher;
use crate::db;
use crate::entity::user;
use crate::error::AppResult;
use crate::services::report;
use crate::services::storage::Storage;

/// Generate today's report for every user who does not have one yet.
///
/// Per-user failures are logged and skipped; one broken user never blocks
/// the rest. Only failing to list users aborts the run.
pub async fn auto_generate_reports(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    storage: Option<&Storage>,
) -> AppResult<()> {
    let today = Local::now().date_naive();
    let today_str = today.format("%Y-%m-%d").to_string();

    let users = db::users::list_all(db).await?;

    for user in users {
        if let Err(e) = generate_for_user(db, cipher, storage, &user, today, &today_str).await {
            warn!("daily report failed for {}: {}", user.email, e);
        }
    }

    Ok(())
}

/// Generate one user's report for the day.
///
/// Users already reported and users with zero commits are skipped. Upload
/// failure leaves the file URL empty; the report still persists.
async fn generate_for_user(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    storage: Option<&Storage>,
    user: &user::Model,
    today: NaiveDate,
    today_str: &str,
) -> AppResult<()> {
    if db::reports::exists_for_date(db, user.id, today_str).await? {
        return Ok(());
    }

    let data = report::build_report_data(db, Some(cipher), user, today).await?;
    if data.stats.total_commits == 0 {
        return Ok(());
    }

    let (template_content, template_id) =
        report::resolve_template_content(db, user.id, None).await?;
    let rendered = report::render(&template_content, &data)?;

    let mut file_url = String::new();
    if let Some(storage) = storage {
        let key = Storage::report_key(&user.id.to_string(), today_str);
        match storage
            .put(&key, rendered.clone().into_bytes(), "text/markdown; charset=utf-8")
            .await
        {
            Ok(url) => file_url = url,
            Err(e) => warn!("report upload failed for {}: {}", user.email, e),
        }
    }

    let title = format!("Daily Report — {}", data.date_formatted);
    db::reports::upsert(
        db,
        user.id,
        today_str,
        &title,
        &rendered,
        template_id,
        &file_url,
    )
    .await?;

    info!(
        "report generated for {}: {} commits, {} cards",
        user.email, data.stats.total_commits, data.stats.total_cards
    );

    Ok(())
}
