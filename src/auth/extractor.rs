//! Actix-web extractor for bearer-token authentication.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use uuid::Uuid;

use super::JwtKeys;
use crate::error::AppError;

/// Extractor that requires a valid session token.
///
/// Handlers take this as a parameter to get the authenticated user ID:
/// ```ignore
/// async fn me(auth: AuthedUser) -> impl Responder { ... }
/// ```
pub struct AuthedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(keys) = req.app_data::<web::Data<JwtKeys>>() else {
            return ready(Err(AppError::Unauthorized(
                "authentication not configured".to_string(),
            )));
        };

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match token {
            Some(token) => ready(keys.validate_token(token).map(|user_id| AuthedUser { user_id })),
            None => ready(Err(AppError::Unauthorized(
                "missing bearer token".to_string(),
            ))),
        }
    }
}
