//! # Configuration Management for Goku services
//!
//! This crate provides environment loading (`.env` files and typed
//! variable access) and the centralized configuration structures shared by
//! the other goku-util crates: database, HTTP, JWT and logging settings.
//!
//! ## Quick Start
//!
//! ### TOML File Configuration
//! ```toml
//! environment = "development"
//!
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "myapp"
//! username = "postgres"
//! password = "password"
//! min_connections = 1
//! max_connections = 10
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//! max_lifetime_seconds = 3600
//!
//! [http]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [jwt]
//! secret = "at-least-thirty-two-bytes-of-secret-material"
//! issuer = "goku"
//! lifetime_seconds = 3600
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from GOKU_CONFIG or ./goku.toml, after reading .env files
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

pub mod env;

pub use env::{
    dotenv_files, get_bool, get_list, get_var, get_var_or, load_dotenv, require_var, Environment,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./goku.toml";
const CONFIG_PATH_VAR: &str = "GOKU_CONFIG";

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {key}: {message}")]
    InvalidVar { key: String, message: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
        }
    }
}

impl HttpConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT signing configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default = "default_jwt_lifetime")]
    pub lifetime_seconds: u64,
    #[serde(default = "default_jwt_leeway")]
    pub leeway_seconds: u64,
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: String,
}

fn default_jwt_lifetime() -> u64 {
    3600
}

fn default_jwt_leeway() -> u64 {
    30
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime_seconds", &self.lifetime_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl JwtConfig {
    /// Create a JWT configuration with default lifetime, leeway and algorithm
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: None,
            audience: None,
            lifetime_seconds: default_jwt_lifetime(),
            leeway_seconds: default_jwt_leeway(),
            algorithm: default_jwt_algorithm(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_lifetime(mut self, lifetime_seconds: u64) -> Self {
        self.lifetime_seconds = lifetime_seconds;
        self
    }

    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "JWT secret must be at least {} bytes (got {})",
                MIN_JWT_SECRET_LENGTH,
                self.secret.len()
            )));
        }
        if self.lifetime_seconds == 0 {
            return Err(ConfigError::Invalid(
                "JWT lifetime_seconds must be greater than 0".to_string(),
            ));
        }
        if !matches!(self.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(ConfigError::Invalid(format!(
                "Unsupported JWT algorithm '{}': expected HS256, HS384 or HS512",
                self.algorithm
            )));
        }
        Ok(())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "full" => Ok(Self::Text),
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid(format!("Unknown log format '{}'", other))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub ansi: bool,
    pub file: Option<PathBuf>,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            ansi: true,
            file: None,
            with_target: true,
        }
    }
}

impl AppConfig {
    /// Load `.env` files for the current environment, then the TOML file
    /// named by `GOKU_CONFIG` (or `./goku.toml`), then `GOKU_*` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::current()?;
        let loaded = load_dotenv(Path::new("."), environment)?;
        tracing::debug!(?environment, files = ?loaded, "Loaded dotenv files");

        let mut config = if let Ok(config_path) = std::env::var(CONFIG_PATH_VAR) {
            Self::read_file(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::read_file(DEFAULT_CONFIG_PATH)?
        } else {
            return Err(ConfigError::Invalid(format!(
                "Config path must be specified as {} or provided in {}",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )));
        };

        config.environment = environment;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply `GOKU_*` overrides using the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("GOKU_DATABASE_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("GOKU_DATABASE_PORT") {
            self.database.port = parse_override("GOKU_DATABASE_PORT", &port)?;
        }
        if let Some(name) = lookup("GOKU_DATABASE_NAME") {
            self.database.database = name;
        }
        if let Some(user) = lookup("GOKU_DATABASE_USER") {
            self.database.username = user;
        }
        if let Some(password) = lookup("GOKU_DATABASE_PASSWORD") {
            self.database.password = password;
        }
        if let Some(host) = lookup("GOKU_HTTP_HOST") {
            self.http.host = host;
        }
        if let Some(port) = lookup("GOKU_HTTP_PORT") {
            self.http.port = parse_override("GOKU_HTTP_PORT", &port)?;
        }
        if let Some(secret) = lookup("GOKU_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Some(issuer) = lookup("GOKU_JWT_ISSUER") {
            self.jwt.issuer = Some(issuer);
        }
        if let Some(level) = lookup("GOKU_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GOKU_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Database validations
        if self.database.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.database.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.database.min_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database min_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.database.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        // HTTP validations
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("HTTP port cannot be zero".to_string()));
        }

        self.jwt.validate()
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl DatabaseConfig {
    /// Create a new database configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
        min_connections: u32,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
        max_lifetime_seconds: u64,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
            min_connections,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
            max_lifetime_seconds,
        }
    }

    /// Build connection string
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}
