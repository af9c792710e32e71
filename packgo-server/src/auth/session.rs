//! Session JWT verification
//!
//! Tokens are issued by the account service; this service only verifies them
//! and turns the claims into an [`Identity`]. `create_token` exists for local
//! tooling and tests.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::{Identity, Role};

use crate::state::AppState;

/// JWT claims of a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account ID
    pub sub: String,
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Identity::new(claims.sub, claims.role)
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a session token
pub fn create_token(
    account_id: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = SessionClaims {
        sub: account_id.to_string(),
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a session token and map failures to API errors
pub fn verify_token(token: &str, secret: &str) -> AppResult<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid session token"),
        }
    })
}

/// Middleware that verifies the Bearer token and inserts the caller's [`Identity`]
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let identity: Identity = verify_token(token, &state.jwt_secret)?.into();
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
