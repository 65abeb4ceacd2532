use axum::Json;
use serde_json::{json, Value};

/// GET /health - liveness only, no database round-trip.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
