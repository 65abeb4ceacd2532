//! Authentication handlers.
//!
//! POST /auth/login - exchange credentials for a bearer token
//! GET  /auth/me    - the account behind the current token

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, Extension, Json};
use gradtrack_core::{
    error::GradError, principal::Principal, service::RegistrarService, types::AuthUser,
    validate::validate_login,
};
use serde::Serialize;
use serde_json::Value;

use super::json_body;
use crate::error::AppError;
use crate::middleware::jwt::JwtConfig;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn login(
    Extension(service): Extension<Arc<dyn RegistrarService>>,
    Extension(jwt): Extension<JwtConfig>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let input = validate_login(&json_body(body)?)?;
    let user = service
        .authenticate(&input)
        .await?
        .ok_or_else(|| GradError::Unauthenticated("Invalid credentials".into()))?;
    let token = jwt.issue(&user)?;
    Ok(Json(TokenResponse { token }))
}

pub async fn me(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn RegistrarService>>,
) -> Result<Json<AuthUser>, AppError> {
    Ok(Json(service.current_user(principal.user_id).await?))
}
