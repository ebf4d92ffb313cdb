//! Commit browsing and manual card-link endpoints.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::db;
use crate::entity::{commit, commit_card_link, repository};
use crate::error::{AppError, AppResult};

/// Default trailing window when no range is given.
const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct ListCommitsQuery {
    /// Inclusive start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub id: Uuid,
    pub repo_id: Uuid,
    pub repo: String,
    pub sha: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub branch: String,
    pub date: DateTime<Utc>,
    pub card_key: Option<String>,
    pub has_link: bool,
}

impl CommitResponse {
    fn from_pair(c: commit::Model, r: &repository::Model) -> Self {
        CommitResponse {
            id: c.id,
            repo_id: c.repo_id,
            repo: format!("{}/{}", r.owner, r.name),
            sha: c.sha,
            message: c.message,
            author: c.author,
            author_email: c.author_email,
            branch: c.branch,
            date: c.date,
            card_key: c.card_key,
            has_link: c.has_link,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub card_key: String,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub commit_id: Uuid,
    pub card_key: String,
    pub linked_at: DateTime<Utc>,
}

impl From<commit_card_link::Model> for LinkResponse {
    fn from(m: commit_card_link::Model) -> Self {
        LinkResponse {
            id: m.id,
            commit_id: m.commit_id,
            card_key: m.card_key,
            linked_at: m.linked_at,
        }
    }
}

fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput("invalid date format, use YYYY-MM-DD".to_string()))
}

#[get("/commits")]
pub async fn list(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ListCommitsQuery>,
) -> AppResult<HttpResponse> {
    let to = match &query.to {
        // End date is inclusive, so the upper bound is the next midnight.
        Some(s) => {
            let date = parse_date(s)?;
            Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
                + Duration::hours(24)
        }
        None => Utc::now(),
    };
    let from = match &query.from {
        Some(s) => {
            let date = parse_date(s)?;
            Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
        }
        None => to - Duration::days(DEFAULT_RANGE_DAYS),
    };

    let rows = db::commits::list_for_user_in_range(&db, auth.user_id, from, to).await?;
    let response: Vec<CommitResponse> = rows
        .into_iter()
        .map(|(c, r)| CommitResponse::from_pair(c, &r))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Manually link a commit to a card. Links accumulate; they are never
/// auto-deleted.
#[post("/commits/{id}/link")]
pub async fn link(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<LinkRequest>,
) -> AppResult<HttpResponse> {
    let card_key = body.card_key.trim();
    if card_key.is_empty() {
        return Err(AppError::InvalidInput("card_key is required".to_string()));
    }

    let commit = db::commits::find_owned(&db, auth.user_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Commit".to_string()))?;

    let link = db::commits::create_link(&db, commit, card_key).await?;

    Ok(HttpResponse::Created().json(LinkResponse::from(link)))
}

#[get("/commits/{id}/links")]
pub async fn links(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let commit = db::commits::find_owned(&db, auth.user_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Commit".to_string()))?;

    let links = db::commits::links_for_commit(&db, commit.id).await?;
    let response: Vec<LinkResponse> = links.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(link).service(links);
}
