//! Student lookup.
//!
//! GET /students/:student/overview - profile, program, approval and awards
//! GET /students/:student/details  - same payload as overview

use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use gradtrack_core::{
    service::RegistrarService, types::StudentOverview, validate::validate_student_number,
};

use crate::error::AppError;

pub async fn overview(
    Extension(service): Extension<Arc<dyn RegistrarService>>,
    Path(student_number): Path<String>,
) -> Result<Json<StudentOverview>, AppError> {
    let student_number = validate_student_number(&student_number)?;
    Ok(Json(service.student_overview(&student_number).await?))
}

pub async fn details(
    service: Extension<Arc<dyn RegistrarService>>,
    path: Path<String>,
) -> Result<Json<StudentOverview>, AppError> {
    overview(service, path).await
}
