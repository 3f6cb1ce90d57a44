use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Logging is already initialized")]
    AlreadyInitialized,

    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("Cannot open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
