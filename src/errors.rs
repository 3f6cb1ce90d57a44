//! Error types for the goku-util facade

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GokuError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] logging::LoggingError),

    #[error("Data access error: {0}")]
    Dal(#[from] dal::DalError),

    #[error("Filter error: {0}")]
    Filter(#[from] filter::FilterError),

    #[error("Type mapping error: {0}")]
    TypeMapping(#[from] type_mapping::TypeMappingError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jwt::JwtError),

    #[error("Route error: {0}")]
    Route(#[from] http_util::RouteError),

    #[error("HTTP server error on {address}: {source}")]
    Server {
        address: String,
        #[source]
        source: std::io::Error,
    },
}
