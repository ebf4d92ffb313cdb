//! Account registration and login.

use actix_web::{HttpResponse, post, web};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{self, JwtKeys};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::UserResponse;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[post("/auth/register")]
pub async fn register(
    db: web::Data<DatabaseConnection>,
    keys: web::Data<JwtKeys>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    if !body.email.contains('@') {
        return Err(AppError::InvalidInput("invalid email address".to_string()));
    }
    if body.password.len() < 8 {
        return Err(AppError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let hash = auth::hash_password(&body.password);
    let user = db::users::create(&db, &body.email, &hash).await?;
    let token = keys.create_token(user.id)?;

    info!("registered user {}", user.email);

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[post("/auth/login")]
pub async fn login(
    db: web::Data<DatabaseConnection>,
    keys: web::Data<JwtKeys>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    // Same error for unknown email and wrong password.
    let user = db::users::find_by_email(&db, &body.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "invalid email or password".to_string(),
        ));
    }

    let token = keys.create_token(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login);
}
