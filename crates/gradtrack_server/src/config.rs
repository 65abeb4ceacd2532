//! Server configuration from environment variables.
//!
//!   DATABASE_URL                  - Postgres connection string (required)
//!   JWT_SECRET                    - JWT HMAC secret (required)
//!   GRADTRACK_BIND_ADDR           - listen address (default: 0.0.0.0:4000)
//!   PORT                          - port only, used when GRADTRACK_BIND_ADDR is unset
//!   CORS_ORIGIN                   - allowed origin (default: *)
//!   GRADTRACK_DB_MAX_CONNECTIONS  - pool size (default: 10)
//!   GRADTRACK_TOKEN_TTL_HOURS     - token lifetime (default: 8)

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub db_max_connections: u32,
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bind_addr = match get("GRADTRACK_BIND_ADDR") {
            Some(addr) => parse("GRADTRACK_BIND_ADDR", &addr)?,
            None => {
                let port: u16 = get("PORT")
                    .map(|p| parse("PORT", &p))
                    .transpose()?
                    .unwrap_or(4000);
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let token_ttl_hours: i64 = get("GRADTRACK_TOKEN_TTL_HOURS")
            .map(|v| parse("GRADTRACK_TOKEN_TTL_HOURS", &v))
            .transpose()?
            .unwrap_or(8);
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "GRADTRACK_TOKEN_TTL_HOURS",
                reason: "must be positive".into(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| "*".into()),
            db_max_connections: get("GRADTRACK_DB_MAX_CONNECTIONS")
                .map(|v| parse("GRADTRACK_DB_MAX_CONNECTIONS", &v))
                .transpose()?
                .unwrap_or(10),
            token_ttl_hours,
        })
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
