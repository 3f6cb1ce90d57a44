//! Token issuing and verification with a shared HMAC secret

use crate::claims::Claims;
use crate::errors::JwtError;
use config::{JwtConfig, MIN_JWT_SECRET_LENGTH};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
    lifetime_seconds: i64,
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.header.alg)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime_seconds", &self.lifetime_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Build a service from configuration.
    ///
    /// Only the HMAC algorithms (HS256, HS384, HS512) are accepted and the
    /// secret must be at least [`MIN_JWT_SECRET_LENGTH`] bytes.
    pub fn new(config: &JwtConfig) -> Result<Self, JwtError> {
        if config.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(JwtError::Config(format!(
                "secret must be at least {} bytes (got {})",
                MIN_JWT_SECRET_LENGTH,
                config.secret.len()
            )));
        }

        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| JwtError::Config(format!("unknown algorithm '{}'", config.algorithm)))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(JwtError::Config(format!(
                "algorithm '{}' needs a key pair, only HMAC algorithms are supported",
                config.algorithm
            )));
        }

        let lifetime_seconds = i64::try_from(config.lifetime_seconds)
            .map_err(|_| JwtError::Config("lifetime_seconds is too large".to_string()))?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_seconds;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            header: Header::new(algorithm),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime_seconds,
        })
    }

    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime_seconds
    }

    /// Claims for `subject` valid from now for the configured lifetime
    pub fn claims<E>(&self, subject: impl Into<String>, extra: E) -> Claims<E> {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: subject.into(),
            iat: now,
            nbf: now,
            exp: now + self.lifetime_seconds,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            extra,
        }
    }

    /// Issue a signed token for `subject`
    pub fn issue<E: Serialize>(&self, subject: impl Into<String>, extra: E) -> Result<String, JwtError> {
        let claims = self.claims(subject, extra);
        let token = self.encode_claims(&claims)?;
        tracing::debug!(sub = %claims.sub, jti = %claims.jti, exp = claims.exp, "Issued JWT");
        Ok(token)
    }

    /// Sign claims as given, without adjusting times or issuer
    pub fn encode_claims<E: Serialize>(&self, claims: &Claims<E>) -> Result<String, JwtError> {
        encode(&self.header, claims, &self.encoding_key).map_err(JwtError::Signing)
    }

    /// Verify a token and return its claims
    pub fn verify<E: DeserializeOwned + Clone>(&self, token: &str) -> Result<Claims<E>, JwtError> {
        let data = decode::<Claims<E>>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT verification failed");
            JwtError::from_verification(e)
        })?;
        Ok(data.claims)
    }

    /// Verify the token of an `Authorization: Bearer <token>` header value
    pub fn verify_bearer<E: DeserializeOwned + Clone>(&self, header: &str) -> Result<Claims<E>, JwtError> {
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(JwtError::MissingBearer)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Map, Value};

    const SECRET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

    fn service() -> JwtService {
        JwtService::new(&JwtConfig::new(SECRET)).unwrap()
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Roles {
        roles: Vec<String>,
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let token = service
            .issue("user-1", Roles { roles: vec!["admin".to_string()] })
            .unwrap();

        let claims: Claims<Roles> = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.extra.roles, vec!["admin"]);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.nbf, claims.iat);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_extra_claims_default_to_map() {
        let service = service();
        let mut extra = Map::new();
        extra.insert("tenant".to_string(), json!("acme"));
        let token = service.issue("user-2", extra).unwrap();

        let claims: Claims = service.verify(&token).unwrap();
        assert_eq!(claims.extra.get("tenant"), Some(&Value::from("acme")));
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let mut claims = service.claims("user", Map::new());
        claims.exp = claims.iat - 3600;
        let token = service.encode_claims(&claims).unwrap();

        assert!(matches!(service.verify::<Map<String, Value>>(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_not_yet_valid_token() {
        let service = service();
        let mut claims = service.claims("user", Map::new());
        claims.nbf = claims.iat + 3600;
        claims.exp = claims.iat + 7200;
        let token = service.encode_claims(&claims).unwrap();

        assert!(matches!(
            service.verify::<Map<String, Value>>(&token),
            Err(JwtError::NotYetValid)
        ));
    }

    #[test]
    fn test_leeway_accepts_recently_expired() {
        let service = service();
        let mut claims = service.claims("user", Map::new());
        claims.exp = claims.iat - 5;
        let token = service.encode_claims(&claims).unwrap();

        assert!(service.verify::<Map<String, Value>>(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret() {
        let other = JwtService::new(&JwtConfig::new("another-secret-that-is-long-enough-x")).unwrap();
        let token = other.issue("user", Map::new()).unwrap();

        assert!(matches!(
            service().verify::<Map<String, Value>>(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_issuer_and_audience() {
        let issuer_a = JwtService::new(&JwtConfig::new(SECRET).with_issuer("a")).unwrap();
        let issuer_b = JwtService::new(&JwtConfig::new(SECRET).with_issuer("b")).unwrap();
        let token = issuer_a.issue("user", Map::new()).unwrap();
        assert!(issuer_a.verify::<Map<String, Value>>(&token).is_ok());
        assert!(matches!(
            issuer_b.verify::<Map<String, Value>>(&token),
            Err(JwtError::InvalidIssuer)
        ));

        let web = JwtService::new(&JwtConfig::new(SECRET).with_audience("web")).unwrap();
        let mobile = JwtService::new(&JwtConfig::new(SECRET).with_audience("mobile")).unwrap();
        let token = web.issue("user", Map::new()).unwrap();
        assert!(matches!(
            mobile.verify::<Map<String, Value>>(&token),
            Err(JwtError::InvalidAudience)
        ));
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            service().verify::<Map<String, Value>>("not-a-token"),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_verify_bearer() {
        let service = service();
        let token = service.issue("user", Map::new()).unwrap();

        let claims: Claims = service.verify_bearer(&format!("Bearer {}", token)).unwrap();
        assert_eq!(claims.sub, "user");

        assert!(matches!(
            service.verify_bearer::<Map<String, Value>>(&token),
            Err(JwtError::MissingBearer)
        ));
        assert!(matches!(
            service.verify_bearer::<Map<String, Value>>("Bearer "),
            Err(JwtError::MissingBearer)
        ));
        assert!(matches!(
            service.verify_bearer::<Map<String, Value>>("Basic dXNlcjpwYXNz"),
            Err(JwtError::MissingBearer)
        ));
    }

    #[test]
    fn test_config_rejected() {
        assert!(matches!(JwtService::new(&JwtConfig::new("short")), Err(JwtError::Config(_))));
        assert!(matches!(
            JwtService::new(&JwtConfig::new(SECRET).with_algorithm("RS256")),
            Err(JwtError::Config(_))
        ));
        assert!(matches!(
            JwtService::new(&JwtConfig::new(SECRET).with_algorithm("nope")),
            Err(JwtError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let output = format!("{:?}", service());
        assert!(!output.contains(SECRET));
        assert!(output.contains("HS256"));
    }
}
