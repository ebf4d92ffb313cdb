//! Report template CRUD endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::db;
use crate::entity::report_template;
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<report_template::Model> for TemplateResponse {
    fn from(m: report_template::Model) -> Self {
        TemplateResponse {
            id: m.id,
            name: m.name,
            content: m.content,
            is_default: m.is_default,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[get("/templates")]
pub async fn list(auth: AuthedUser, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let templates = db::templates::list_for_user(&db, auth.user_id).await?;
    let response: Vec<TemplateResponse> = templates.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(response))
}

#[post("/templates")]
pub async fn create(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateTemplateRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    if body.name.trim().is_empty() || body.content.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "name and content are required".to_string(),
        ));
    }

    let template = db::templates::create(&db, auth.user_id, &body.name, &body.content).await?;

    let template = if body.is_default {
        db::templates::set_default(&db, auth.user_id, template.id).await?
    } else {
        template
    };

    Ok(HttpResponse::Created().json(TemplateResponse::from(template)))
}

#[put("/templates/{id}")]
pub async fn update(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTemplateRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let template = db::templates::update(
        &db,
        auth.user_id,
        path.into_inner(),
        body.name,
        body.content,
    )
    .await?;

    Ok(HttpResponse::Ok().json(TemplateResponse::from(template)))
}

#[delete("/templates/{id}")]
pub async fn remove(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    db::templates::delete(&db, auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "template deleted" })))
}

/// Flag one template as the user's default, clearing any other.
#[post("/templates/{id}/default")]
pub async fn set_default(
    auth: AuthedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let template = db::templates::set_default(&db, auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TemplateResponse::from(template)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(update)
        .service(remove)
        .service(set_default);
}
