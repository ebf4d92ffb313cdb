//! Report generation and browsing endpoints.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Local, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::crypto::TokenCipher;
use crate::db;
use crate::entity::report;
use crate::error::{AppError, AppResult};
use crate::services::report as generator;
use crate::services::storage::Storage;

#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    /// Defaults to today
    pub date: Option<String>,
    /// Defaults to the user's flagged default, then the built-in template
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub date: String,
    pub title: String,
    pub content: String,
    pub file_url: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<report::Model> for ReportResponse {
    fn from(m: report::Model) -> Self {
        ReportResponse {
            id: m.id,
            date: m.date,
            title: m.title,
            content: m.content,
            file_url: m.file_url,
            template_id: m.template_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Generate (or regenerate) the report for one date.
///
/// Upserts by (user, date). Upload failure is logged and leaves the file
/// URL empty; the report still persists.
#[post("/reports/generate")]
pub async fn generate(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    cipher: web::Data<TokenCipher>,
    storage: Option<web::Data<Storage>>,
    body: web::Json<GenerateReportRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let date = match body.date.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidInput("invalid date format, use YYYY-MM-DD".to_string()))?,
        None => Local::now().date_naive(),
    };
    let date_str = date.format("%Y-%m-%d").to_string();

    let user = db::users::find_by_id(&db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let data = generator::build_report_data(&db, Some(&cipher), &user, date).await?;

    let (template_content, template_id) =
        generator::resolve_template_content(&db, auth.user_id, body.template_id).await?;

    let rendered = generator::render(&template_content, &data)?;

    let mut file_url = String::new();
    if let Some(storage) = &storage {
        let key = Storage::report_key(&auth.user_id.to_string(), &date_str);
        match storage
            .put(&key, rendered.clone().into_bytes(), "text/markdown; charset=utf-8")
            .await
        {
            Ok(url) => file_url = url,
            Err(e) => warn!("report upload failed: {}", e),
        }
    }

    let title = format!("Daily Report — {}", data.date_formatted);
    let saved = db::reports::upsert(
        &db,
        auth.user_id,
        &date_str,
        &title,
        &rendered,
        template_id,
        &file_url,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ReportResponse::from(saved)))
}

#[get("/reports")]
pub async fn list(auth: AuthedUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let reports = db::reports::list_for_user(&db, auth.user_id).await?;
    let response: Vec<ReportResponse> = reports.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[get("/reports/{id}")]
pub async fn get(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report = db::reports::find_owned(&db, auth.user_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Report".to_string()))?;

    Ok(HttpResponse::Ok().json(ReportResponse::from(report)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(generate).service(list).service(get);
}
