//! HTTP route wrapping for Goku services
//!
//! Describe handlers as [`Route`]s, then [`build_router`] turns them into
//! an axum [`Router`](axum::Router) with versioned paths, bearer
//! authentication, request tracing and JSON errors.

pub mod auth;
pub mod errors;
pub mod route;
pub mod router;

pub use auth::{require_auth, AuthClaims};
pub use errors::{ApiError, RouteError};
pub use route::{normalize_path, HttpMethod, Route};
pub use router::build_router;
