//! gradtrack_server: standalone REST server for the graduation tracker.
//!
//! Configuration is read from the environment (optionally a `.env` file);
//! see [`gradtrack_server::config`] for the variables.

use std::sync::Arc;

use gradtrack_core::service::{RegistrarService, RegistrarServiceImpl};
use gradtrack_postgres::{PgStores, MIGRATOR};
use gradtrack_server::config::ServerConfig;
use gradtrack_server::middleware::jwt::JwtConfig;
use gradtrack_server::router::build_router;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gradtrack_server=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations applied");

    let stores = PgStores::new(pool);
    let service: Arc<dyn RegistrarService> = Arc::new(RegistrarServiceImpl::new(
        Arc::new(stores.checklists),
        Arc::new(stores.approvals),
        Arc::new(stores.students),
        Arc::new(stores.users),
    ));

    let jwt_config = JwtConfig::from_secret(config.jwt_secret.as_bytes())
        .with_ttl_hours(config.token_ttl_hours);

    let app = build_router(service, jwt_config, &config.cors_origin);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("gradtrack_server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
