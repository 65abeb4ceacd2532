//! Router construction for the graduation tracker server.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_mw,
    routing::{get, patch, post},
    Extension, Router,
};
use gradtrack_core::service::RegistrarService;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::jwt::{jwt_auth, require_registrar, JwtConfig};

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    match origin {
        "*" => layer.allow_origin(Any),
        other => match HeaderValue::from_str(other) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!(origin = other, "unusable CORS origin, allowing none");
                layer
            }
        },
    }
}

/// Build the full axum router with all routes and middleware.
pub fn build_router(
    service: Arc<dyn RegistrarService>,
    jwt_config: JwtConfig,
    cors_origin: &str,
) -> Router {
    // Registrar-only routes. Every path segment after /students is named
    // `student`; handlers decide whether it is a student number or an id.
    let registrar = Router::new()
        .route(
            "/students/:student/overview",
            get(handlers::students::overview),
        )
        .route(
            "/students/:student/details",
            get(handlers::students::details),
        )
        .route(
            "/students/:student/checklist",
            get(handlers::checklist::get_checklist).patch(handlers::checklist::update_checklist),
        )
        .route(
            "/students/:student/checklist/summary",
            get(handlers::checklist::get_summary),
        )
        .route(
            "/students/:student/status",
            patch(handlers::approval::update_status),
        )
        .layer(axum_mw::from_fn(require_registrar));

    // Any valid token
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .merge(registrar)
        .layer(axum_mw::from_fn(jwt_auth));

    // Public routes (no auth)
    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/login", post(handlers::auth::login));

    public
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(Extension(service))
        .layer(Extension(jwt_config))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}
