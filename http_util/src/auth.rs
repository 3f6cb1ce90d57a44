//! Bearer token middleware and the claims extractor

use crate::errors::ApiError;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use jwt::{Claims, JwtService};
use std::sync::Arc;

/// Verified claims of the current request
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

/// Reject requests without a valid `Authorization: Bearer` token and store
/// the verified claims in the request extensions
pub async fn require_auth(
    State(jwt): State<Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header encoding"))?;

    let claims: Claims = jwt.verify_bearer(header).map_err(|e| {
        tracing::warn!(error = %e, path = %request.uri().path(), "Authentication failed");
        ApiError::from(e)
    })?;

    tracing::debug!(sub = %claims.sub, "Authenticated request");
    request.extensions_mut().insert(AuthClaims(claims));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthClaims>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Request is not authenticated"))
    }
}
