//! Serialization utilities
//!
//! This module turns serializable Rust values into column maps.

use crate::errors::TypeMappingError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `data` and return its top-level JSON object
pub fn to_column_map<T: Serialize>(data: &T) -> Result<Map<String, Value>, TypeMappingError> {
    match serde_json::to_value(data)? {
        Value::Object(map) => Ok(map),
        other => Err(TypeMappingError::NotAnObject(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Product {
        name: String,
        price: f64,
        tags: Vec<String>,
    }

    #[test]
    fn test_to_column_map() {
        let product = Product {
            name: "Lamp".to_string(),
            price: 12.5,
            tags: vec!["home".to_string()],
        };

        let map = to_column_map(&product).unwrap();
        assert_eq!(map.get("name"), Some(&json!("Lamp")));
        assert_eq!(map.get("price"), Some(&json!(12.5)));
        assert_eq!(map.get("tags"), Some(&json!(["home"])));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            to_column_map(&vec![1, 2]),
            Err(TypeMappingError::NotAnObject(_))
        ));
    }
}
