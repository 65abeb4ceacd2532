//! HTTP error mapping.
//!
//! Every handler returns `Result<_, AppError>`. The body is always
//! `{"message": ...}`, with `issues` added for validation failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gradtrack_core::error::GradError;
use serde_json::json;

#[derive(Debug)]
pub struct AppError(pub GradError);

impl From<GradError> for AppError {
    fn from(e: GradError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = match &self.0 {
            GradError::Validation(issues) => {
                tracing::debug!(?issues, "request rejected");
                json!({ "message": "Invalid request", "issues": issues })
            }
            GradError::Unauthenticated(msg) | GradError::NotFound(msg) => json!({ "message": msg }),
            GradError::Forbidden(detail) => {
                tracing::debug!("forbidden: {detail}");
                json!({ "message": "Forbidden" })
            }
            GradError::Storage(e) => {
                tracing::error!("storage failure: {e:#}");
                json!({ "message": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use http_body_util::BodyExt;

    async fn render(e: GradError) -> (StatusCode, serde_json::Value) {
        let resp = AppError(e).into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_issues() {
        let (status, body) = render(GradError::invalid("items.0.status", "bad")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request");
        assert_eq!(body["issues"][0]["path"], "items.0.status");
    }

    #[tokio::test]
    async fn storage_detail_is_hidden() {
        let (status, body) = render(GradError::Storage(anyhow!("password=hunter2"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn forbidden_is_generic() {
        let (status, body) = render(GradError::Forbidden("u lacks ADMIN".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Forbidden");
    }
}
