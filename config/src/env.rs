//! Environment detection, `.env` file loading and typed variable access.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// Read the environment from `GOKU_ENV`, falling back to `APP_ENV`.
    pub fn current() -> Result<Self, ConfigError> {
        let raw = std::env::var("GOKU_ENV").or_else(|_| std::env::var("APP_ENV"));
        match raw {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "test" | "testing" => Ok(Self::Test),
            "stage" | "staging" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidVar {
                key: "GOKU_ENV".to_string(),
                message: format!("unknown environment '{}'", other),
            }),
        }
    }
}

/// `.env` file names for an environment, highest priority first.
///
/// `.env.local` is skipped for [`Environment::Test`] so test runs stay
/// reproducible across machines.
pub fn dotenv_files(env: Environment) -> Vec<String> {
    let name = env.as_str();
    let mut files = vec![format!(".env.{}.local", name), format!(".env.{}", name)];
    if env != Environment::Test {
        files.push(".env.local".to_string());
    }
    files.push(".env".to_string());
    files
}

/// Load every existing `.env` file for `env` from `dir`.
///
/// Variables already present in the process environment are never
/// overridden, so earlier files in [`dotenv_files`] win over later ones.
pub fn load_dotenv(dir: &Path, env: Environment) -> Result<Vec<PathBuf>, ConfigError> {
    let mut loaded = Vec::new();
    for file in dotenv_files(env) {
        let path = dir.join(&file);
        if !path.is_file() {
            continue;
        }
        dotenvy::from_path(&path)?;
        tracing::trace!(path = %path.display(), "Loaded dotenv file");
        loaded.push(path);
    }
    Ok(loaded)
}

/// Parse an environment variable, `None` when unset.
pub fn get_var<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVar {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidVar {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Parse an environment variable or fall back to `default` when unset.
pub fn get_var_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_var(key)?.unwrap_or(default))
}

/// Parse an environment variable that must be present.
pub fn require_var<T>(key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_var(key)?.ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

/// Read a boolean flag: `1/true/yes/on` or `0/false/no/off`.
pub fn get_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = get_var::<String>(key)? else {
        return Ok(None);
    };
    parse_bool(&raw).map(Some).ok_or_else(|| ConfigError::InvalidVar {
        key: key.to_string(),
        message: format!("'{}' is not a boolean", raw),
    })
}

/// Read a comma separated list, trimming entries and dropping empty ones.
pub fn get_list(key: &str) -> Result<Vec<String>, ConfigError> {
    Ok(get_var::<String>(key)?
        .map(|raw| split_list(&raw))
        .unwrap_or_default())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("Testing".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!(" stage ".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_dotenv_file_order() {
        assert_eq!(
            dotenv_files(Environment::Development),
            vec![
                ".env.development.local",
                ".env.development",
                ".env.local",
                ".env"
            ]
        );
        assert_eq!(
            dotenv_files(Environment::Test),
            vec![".env.test.local", ".env.test", ".env"]
        );
    }

    #[test]
    fn test_load_dotenv_priority() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env.staging"),
            "GOKU_CFG_TEST_PRIORITY=staging\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "GOKU_CFG_TEST_PRIORITY=base\nGOKU_CFG_TEST_BASE_ONLY=yes\n",
        )
        .unwrap();

        let loaded = load_dotenv(dir.path(), Environment::Staging).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(
            get_var::<String>("GOKU_CFG_TEST_PRIORITY").unwrap().as_deref(),
            Some("staging")
        );
        assert_eq!(get_bool("GOKU_CFG_TEST_BASE_ONLY").unwrap(), Some(true));
    }

    #[test]
    fn test_missing_var_helpers() {
        let key = "GOKU_CFG_TEST_DEFINITELY_UNSET";
        assert_eq!(get_var::<u16>(key).unwrap(), None);
        assert_eq!(get_var_or::<u16>(key, 42).unwrap(), 42);
        assert!(matches!(
            require_var::<String>(key),
            Err(ConfigError::MissingVar(k)) if k == key
        ));
        assert!(get_list(key).unwrap().is_empty());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_bool("On"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
    }
}
