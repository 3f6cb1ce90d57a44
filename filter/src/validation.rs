//! Validation module
//!
//! SQL identifiers are validated before they are interpolated into
//! statements, and always emitted double-quoted.

use std::fmt;
use thiserror::Error;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    #[error("Invalid characters in name '{0}': only alphanumeric characters and underscores are allowed")]
    InvalidCharacters(String),
    /// Name is too long (PostgreSQL limit is 63 bytes)
    #[error("Name '{name}' is too long: {length} characters (max {max_length})")]
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    #[error("Name cannot be empty")]
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    #[error("Name '{0}' must start with a letter or underscore")]
    InvalidStartCharacter(String),
}

/// PostgreSQL identifier length limit
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// A validated identifier that is safe to use in SQL queries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedIdentifier(String);

impl ValidatedIdentifier {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The identifier wrapped in double quotes
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for ValidatedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Common validation logic for SQL identifiers
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let Some(first_char) = name.chars().next() else {
        return Err(ValidationError::Empty);
    };

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            name: name.to_string(),
            length: name.len(),
            max_length: MAX_IDENTIFIER_LENGTH,
        });
    }

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(ValidationError::InvalidStartCharacter(name.to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}

/// Validate and double-quote an identifier in one step
pub fn quote_identifier(name: &str) -> Result<String, ValidationError> {
    Ok(ValidatedIdentifier::new(name)?.quoted())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        let max_length = "a".repeat(63);
        let valid_names = [
            "users",
            "user_profiles",
            "_private",
            "table123",
            "select",
            max_length.as_str(),
        ];

        for name in valid_names {
            assert!(
                ValidatedIdentifier::new(name).is_ok(),
                "Should accept valid name: {}",
                name
            );
        }
    }

    #[test]
    fn test_invalid_identifiers() {
        let test_cases = [
            ("", ValidationError::Empty),
            (
                "123table",
                ValidationError::InvalidStartCharacter("123table".to_string()),
            ),
            (
                "user-name",
                ValidationError::InvalidCharacters("user-name".to_string()),
            ),
            (
                "user name",
                ValidationError::InvalidCharacters("user name".to_string()),
            ),
            (
                "name\"; DROP TABLE users; --",
                ValidationError::InvalidCharacters("name\"; DROP TABLE users; --".to_string()),
            ),
            (
                "café",
                ValidationError::InvalidCharacters("café".to_string()),
            ),
        ];

        for (name, expected) in test_cases {
            assert_eq!(validate_identifier(name), Err(expected), "{}", name);
        }
    }

    #[test]
    fn test_too_long() {
        let name = "a".repeat(64);
        assert!(matches!(
            validate_identifier(&name),
            Err(ValidationError::TooLong { length: 64, .. })
        ));
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_identifier("created_at").unwrap(), "\"created_at\"");
        assert!(quote_identifier("1x").is_err());
    }
}
