//! Tracing subscriber setup for Goku services
//!
//! [`init`] installs one global subscriber from a [`LoggingConfig`]: an
//! [`EnvFilter`] plus one of the `text` ([`GokuFormat`]), `compact`,
//! `pretty` or `json` formatters, writing to stderr or a log file.

pub mod errors;
pub mod format;

pub use errors::LoggingError;
pub use format::GokuFormat;

use config::{LogFormat, LoggingConfig};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Filter from `RUST_LOG` when set and valid, else from `level`
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        filter: level.to_string(),
        message: e.to_string(),
    })
}

/// Install the global subscriber. Fails with
/// [`LoggingError::AlreadyInitialized`] on every call after the first
/// successful one.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    if LOGGING_INIT.get().is_some() {
        return Err(LoggingError::AlreadyInitialized);
    }

    let filter = build_filter(&config.level)?;

    match &config.file {
        Some(path) => install(config, filter, open_log_file(path)?, false)?,
        None => install(config, filter, io::stderr, config.ansi)?,
    }

    LOGGING_INIT
        .set(())
        .map_err(|()| LoggingError::AlreadyInitialized)?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        file = ?config.file,
        "Logging initialized"
    );
    Ok(())
}

fn install<W>(config: &LoggingConfig, filter: EnvFilter, writer: W, ansi: bool) -> Result<(), LoggingError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry();

    match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(GokuFormat::new().with_target(config.with_target))
                    .with_writer(writer)
                    .with_ansi(ansi),
            )
            .with(filter)
            .try_init()?,
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.with_target)
                    .with_writer(writer)
                    .with_ansi(ansi),
            )
            .with(filter)
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.with_target)
                    .with_writer(writer)
                    .with_ansi(ansi),
            )
            .with(filter)
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(config.with_target)
                    .with_writer(writer),
            )
            .with(filter)
            .try_init()?,
    }
    Ok(())
}

/// Thread-safe append-mode file writer
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.file.lock().map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.file.lock().map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn open_log_file(path: &Path) -> Result<LogFileWriter, LoggingError> {
    let io_error = |source| LoggingError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(build_filter("debug,sqlx=warn").is_ok());
        assert!(matches!(
            build_filter("dal=notalevel"),
            Err(LoggingError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_log_file_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("goku.log");

        let mut writer = open_log_file(&path).unwrap();
        writer.write_all(b"first\n").unwrap();
        let mut writer = open_log_file(&path).unwrap();
        writer.write_all(b"second\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_init_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            file: Some(dir.path().join("app.log")),
            ..LoggingConfig::default()
        };

        init(&config).unwrap();
        tracing::info!(user = "ada", "Logged to file");
        assert!(matches!(init(&config), Err(LoggingError::AlreadyInitialized)));

        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let contents = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(contents.contains("Logged to file user=\"ada\""));
    }
}
