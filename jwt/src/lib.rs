//! JWT issue and verify for Goku services
//!
//! ```
//! use config::JwtConfig;
//! use jwt::{Claims, JwtService};
//!
//! let service = JwtService::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-bytes")).unwrap();
//! let token = service.issue("user-42", serde_json::Map::new()).unwrap();
//! let claims: Claims = service.verify(&token).unwrap();
//! assert_eq!(claims.sub, "user-42");
//! ```

pub mod claims;
pub mod errors;
pub mod service;

pub use claims::Claims;
pub use errors::JwtError;
pub use service::JwtService;
