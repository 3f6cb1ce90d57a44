//! Error types and JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dal::DalError;
use jwt::JwtError;
use thiserror::Error;

use crate::route::HttpMethod;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route {method} {path} is registered twice")]
    Duplicate { method: HttpMethod, path: String },

    #[error("Route {path} requires authentication but no JWT service was given")]
    MissingAuthenticator { path: String },

    #[error("Invalid route path '{path}': {message}")]
    InvalidPath { path: String, message: String },
}

/// An error returned from a handler, rendered as
/// `{"error": {"code": <status>, "message": <message>}}`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), message = %self.message, "Request failed");
        }

        let body = serde_json::json!({
            "error": {
                "code": self.status.as_u16(),
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<DalError> for ApiError {
    fn from(err: DalError) -> Self {
        if err.is_not_found() {
            return Self::not_found(err.to_string());
        }
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        tracing::error!(error = %err, "Data access failed");
        Self::internal("Internal server error")
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Config(_) | JwtError::Signing(_) => {
                tracing::error!(error = %err, "JWT service failed");
                Self::internal("Internal server error")
            }
            other => Self::unauthorized(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError::bad_request("price must be positive").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": {"code": 400, "message": "price must be positive"}})
        );
    }

    #[test]
    fn test_from_dal_error() {
        assert_eq!(
            ApiError::from(DalError::not_found("Order", "42")).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DalError::unknown_field("Order", "colour")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DalError::immutable_field("Order", "id")).status,
            StatusCode::BAD_REQUEST
        );

        let internal = ApiError::from(DalError::Sqlx(dal::sqlx::Error::PoolTimedOut));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.message, "Internal server error");
    }

    #[test]
    fn test_from_jwt_error() {
        assert_eq!(ApiError::from(JwtError::Expired).status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(JwtError::MissingBearer).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(JwtError::Config("bad".to_string())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
