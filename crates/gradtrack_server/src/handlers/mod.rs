pub mod approval;
pub mod auth;
pub mod checklist;
pub mod health;
pub mod students;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use gradtrack_core::error::GradError;
use serde_json::Value;

use crate::error::AppError;

/// Unwrap a JSON body, turning a malformed or missing body into a 400 with
/// the same shape as any other validation failure.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(v)| v)
        .map_err(|rejection| GradError::invalid("", rejection.body_text()).into())
}

pub async fn not_found() -> AppError {
    AppError(GradError::NotFound("Not found".into()))
}
