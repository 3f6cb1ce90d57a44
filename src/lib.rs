//! # goku-util
//!
//! Shared utility packages for Goku backends: environment loading, logging
//! setup, JWT issue/verify, HTTP route wrapping, a typed filter system and
//! a generic PostgreSQL data access layer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use goku_util::prelude::*;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Product {
//!     #[serde(flatten)]
//!     pub meta: Meta,
//!     pub name: String,
//!     pub price: i64,
//! }
//!
//! impl Entity for Product {
//!     fn entity_name() -> &'static str {
//!         "Product"
//!     }
//!     fn columns() -> &'static [Column] {
//!         const COLUMNS: &[Column] = &[
//!             Column::new("name", ColumnType::Text),
//!             Column::new("price", ColumnType::BigInt),
//!         ];
//!         COLUMNS
//!     }
//!     fn meta(&self) -> &Meta {
//!         &self.meta
//!     }
//!     fn meta_mut(&mut self) -> &mut Meta {
//!         &mut self.meta
//!     }
//! }
//!
//! async fn health() -> &'static str {
//!     "ok"
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GokuError> {
//!     let goku = Goku::from_env().await?;
//!
//!     let products = EntityDal::<Product>::new();
//!     let created = products
//!         .insert(
//!             goku.provider(),
//!             Product { meta: Meta::new(), name: "Lamp".to_string(), price: 1999 },
//!         )
//!         .await?;
//!     println!("Created product {}", created.id());
//!
//!     goku.serve(vec![Route::get("health", health).version(1)]).await
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

pub use core::Goku;
pub use errors::GokuError;

pub use config::{AppConfig, DatabaseConfig, HttpConfig, JwtConfig, LoggingConfig};

// Member crates
pub use config;
pub use dal;
pub use filter;
pub use http_util;
pub use jwt;
pub use logging;
pub use naming;
pub use type_mapping;

// External dependencies used in the public API
pub use async_trait;
pub use axum;
pub use sqlx;
