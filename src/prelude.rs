//! Convenience re-exports for common goku-util usage
//!
//! ```rust
//! use goku_util::prelude::*;
//! ```

pub use crate::core::Goku;
pub use crate::errors::GokuError;

// Configuration
pub use config::{AppConfig, DatabaseConfig, Environment, HttpConfig, JwtConfig, LoggingConfig};

// Data access
pub use dal::prelude::*;
pub use type_mapping::SqlValue;

// HTTP and auth
pub use http_util::{build_router, ApiError, AuthClaims, Route};
pub use jwt::{Claims, JwtService};

pub use naming::Name;

// Common external dependencies
pub use anyhow;
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use tokio;
