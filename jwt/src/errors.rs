use jsonwebtoken::errors::{Error as JsonWebTokenError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token issuer is invalid")]
    InvalidIssuer,

    #[error("Token audience is invalid")]
    InvalidAudience,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Authorization header must use the Bearer scheme")]
    MissingBearer,

    #[error("JWT configuration error: {0}")]
    Config(String),

    #[error("Failed to sign token: {0}")]
    Signing(#[source] JsonWebTokenError),
}

impl JwtError {
    /// Classify a verification failure
    pub(crate) fn from_verification(err: JsonWebTokenError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            _ => Self::Malformed(err.to_string()),
        }
    }
}
