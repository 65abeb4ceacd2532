//! Bearer-token authentication.
//!
//! `jwt_auth` verifies the HS256 token and inserts a [`Principal`] into the
//! request extensions; `require_registrar` then gates the registrar routes on
//! the caller's role.

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Extension,
};
use chrono::{Duration, Utc};
use gradtrack_core::{
    error::GradError,
    principal::{Principal, TokenClaims},
    types::AuthUser,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";
const DEFAULT_TTL_HOURS: i64 = 8;

#[derive(Clone)]
pub struct JwtConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    pub fn with_ttl_hours(mut self, hours: i64) -> Self {
        self.ttl = Duration::hours(hours);
        self
    }

    /// Mint a token carrying `{userId, role}` for an authenticated user.
    pub fn issue(&self, user: &AuthUser) -> Result<String, GradError> {
        let now = Utc::now();
        let claims = TokenClaims {
            user_id: user.user_id,
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| GradError::Storage(anyhow::anyhow!("signing token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, GradError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token rejected: {e}");
                GradError::Unauthenticated("Invalid token".into())
            })
    }
}

pub async fn jwt_auth(
    Extension(config): Extension<JwtConfig>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or_else(|| GradError::Unauthenticated("Unauthorized".into()))?;

    let claims = config.verify(token)?;
    req.extensions_mut().insert(Principal::from_claims(&claims));
    Ok(next.run(req).await)
}

pub async fn require_registrar(
    Extension(principal): Extension<Principal>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    principal.require_registrar()?;
    Ok(next.run(req).await)
}
