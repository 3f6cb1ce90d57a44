use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered claims plus application claims flattened into the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims<E = Map<String, Value>> {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(flatten)]
    pub extra: E,
}

impl<E> Claims<E> {
    /// Seconds until expiry relative to `now` (negative once expired)
    pub fn expires_in(&self, now: i64) -> i64 {
        self.exp - now
    }
}
