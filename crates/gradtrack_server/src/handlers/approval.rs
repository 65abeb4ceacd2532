//! PATCH /students/:student/status - upsert the student's approval record.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use gradtrack_core::{
    service::RegistrarService,
    types::ApprovalRecord,
    validate::{validate_approval_update, validate_uuid},
};
use serde_json::Value;

use super::json_body;
use crate::error::AppError;

pub async fn update_status(
    Extension(service): Extension<Arc<dyn RegistrarService>>,
    Path(student_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApprovalRecord>, AppError> {
    let student_id = validate_uuid("studentId", &student_id)?;
    let update = validate_approval_update(&json_body(body)?)?;
    Ok(Json(service.upsert_approval(student_id, update).await?))
}
