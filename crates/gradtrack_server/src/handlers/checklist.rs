//! Checklist handlers.
//!
//! GET   /students/:student/checklist         - full checklist
//! GET   /students/:student/checklist/summary - completion and derived status
//! PATCH /students/:student/checklist         - upsert items, return full checklist

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use gradtrack_core::{
    service::RegistrarService,
    status::ChecklistSummary,
    types::ChecklistItem,
    validate::{validate_checklist_update, validate_uuid},
};
use serde_json::Value;

use super::json_body;
use crate::error::AppError;

pub async fn get_checklist(
    Extension(service): Extension<Arc<dyn RegistrarService>>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<ChecklistItem>>, AppError> {
    let student_id = validate_uuid("studentId", &student_id)?;
    Ok(Json(service.checklist(student_id).await?))
}

pub async fn get_summary(
    Extension(service): Extension<Arc<dyn RegistrarService>>,
    Path(student_id): Path<String>,
) -> Result<Json<ChecklistSummary>, AppError> {
    let student_id = validate_uuid("studentId", &student_id)?;
    Ok(Json(service.checklist_summary(student_id).await?))
}

pub async fn update_checklist(
    Extension(service): Extension<Arc<dyn RegistrarService>>,
    Path(student_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<ChecklistItem>>, AppError> {
    let student_id = validate_uuid("studentId", &student_id)?;
    let items = validate_checklist_update(&json_body(body)?)?;
    Ok(Json(service.update_checklist(student_id, items).await?))
}
