//! Role-gated auth extractors.
//!
//! Token issuance lives in the auth service; this side only verifies the
//! HS256 signature and gates each handler on the role the token carries.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use uuid::Uuid;

use super::claims::{ActorRole, Claims};
use crate::app::AppState;
use crate::error::ErrorResponse;

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken(String),
    WrongRole,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing authorization token",
            ),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid authorization format",
            ),
            AuthError::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token",
            ),
            AuthError::WrongRole => (StatusCode::FORBIDDEN, "FORBIDDEN", "Access denied"),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        };

        (status, Json(body)).into_response()
    }
}

fn verify_token(parts: &Parts, secret: &str) -> Result<Claims, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "JWT verification failed");
        AuthError::InvalidToken(e.to_string())
    })?;

    Ok(data.claims)
}

fn require_role(parts: &Parts, state: &AppState, role: ActorRole) -> Result<Uuid, AuthError> {
    let claims = verify_token(parts, &state.settings.jwt_secret)?;
    if claims.role != role {
        return Err(AuthError::WrongRole);
    }
    Ok(claims.sub)
}

/// Extractor that requires a vendor session
#[derive(Debug, Clone, Copy)]
pub struct RequireVendor {
    pub vendor_id: Uuid,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireVendor {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let vendor_id = require_role(parts, state, ActorRole::Vendor)?;
        Ok(RequireVendor { vendor_id })
    }
}

/// Extractor that requires a worker session
#[derive(Debug, Clone, Copy)]
pub struct RequireWorker {
    pub worker_id: Uuid,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireWorker {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let worker_id = require_role(parts, state, ActorRole::Worker)?;
        Ok(RequireWorker { worker_id })
    }
}
