//! Name and case conversion.
//!
//! A [`Name`] is an ordered list of lower-case words parsed from any common
//! identifier spelling, rendered back in whichever case a target needs:
//!
//! ```
//! use naming::Name;
//!
//! let name = Name::new("HTTPServerConfig");
//! assert_eq!(name.to_snake(), "http_server_config");
//! assert_eq!(name.to_camel(), "httpServerConfig");
//! assert_eq!(naming::table_name("UserAddress"), "user_addresses");
//! ```

use heck::ToSnakeCase;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An identifier split into lower-case words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    words: Vec<String>,
}

impl Name {
    /// Split `raw` into words.
    ///
    /// Underscores, hyphens and spaces separate words, as do lower-to-upper
    /// transitions. Runs of capitals form one word (`HTTPServer` becomes
    /// `http` and `server`); digits stay attached to the preceding word.
    pub fn new(raw: &str) -> Self {
        let words = raw
            .to_snake_case()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }

    /// Build a name from already separated words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .flat_map(|word| Name::new(word.as_ref()).words)
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `user_name`
    pub fn to_snake(&self) -> String {
        self.words.join("_")
    }

    /// `USER_NAME`
    pub fn to_screaming_snake(&self) -> String {
        self.to_snake().to_ascii_uppercase()
    }

    /// `userName`
    pub fn to_camel(&self) -> String {
        let mut out = String::new();
        for (i, word) in self.words.iter().enumerate() {
            if i == 0 {
                out.push_str(word);
            } else {
                out.push_str(&capitalize(word));
            }
        }
        out
    }

    /// `UserName`
    pub fn to_pascal(&self) -> String {
        self.words.iter().map(|word| capitalize(word)).collect()
    }

    /// `user-name`
    pub fn to_kebab(&self) -> String {
        self.words.join("-")
    }

    /// `User Name`
    pub fn to_title(&self) -> String {
        self.words
            .iter()
            .map(|word| capitalize(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `username`
    pub fn to_compound(&self) -> String {
        self.words.concat()
    }

    /// Pluralize the last word only (`user_address` -> `user_addresses`).
    pub fn to_plural(&self) -> Self {
        self.map_last(|word| pluralizer::pluralize(word, 2, false))
    }

    /// Singularize the last word only (`user_addresses` -> `user_address`).
    pub fn to_singular(&self) -> Self {
        self.map_last(|word| pluralizer::pluralize(word, 1, false))
    }

    /// A new name with `other`'s words after this name's words.
    pub fn append(&self, other: impl Into<Name>) -> Self {
        let mut words = self.words.clone();
        words.extend(other.into().words);
        Self { words }
    }

    /// A new name with `other`'s words before this name's words.
    pub fn prepend(&self, other: impl Into<Name>) -> Self {
        let mut words = other.into().words;
        words.extend(self.words.iter().cloned());
        Self { words }
    }

    fn map_last<F>(&self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        let mut words = self.words.clone();
        if let Some(last) = words.last_mut() {
            *last = f(last).to_lowercase();
        }
        Self { words }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Database table name for an entity: snake case, plural.
pub fn table_name(entity: &str) -> String {
    Name::new(entity).to_plural().to_snake()
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_snake())
    }
}

impl FromStr for Name {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Name::new(s))
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(&value)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_snake())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Name::new(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_common_spellings() {
        let expected = vec!["user", "name"];
        for raw in [
            "user_name",
            "user-name",
            "userName",
            "UserName",
            "USER_NAME",
            "User Name",
        ] {
            assert_eq!(Name::new(raw).words(), expected.as_slice(), "{}", raw);
        }
    }

    #[test]
    fn test_acronyms_and_digits() {
        assert_eq!(Name::new("HTTPServer").words(), ["http", "server"]);
        assert_eq!(Name::new("XMLHttpRequest").to_snake(), "xml_http_request");
        assert_eq!(Name::new("FIELD_NAME11").to_snake(), "field_name11");
    }

    #[test]
    fn test_conversions() {
        let name = Name::new("order_line_item");
        assert_eq!(name.to_snake(), "order_line_item");
        assert_eq!(name.to_screaming_snake(), "ORDER_LINE_ITEM");
        assert_eq!(name.to_camel(), "orderLineItem");
        assert_eq!(name.to_pascal(), "OrderLineItem");
        assert_eq!(name.to_kebab(), "order-line-item");
        assert_eq!(name.to_title(), "Order Line Item");
        assert_eq!(name.to_compound(), "orderlineitem");
        assert_eq!(name.to_string(), "order_line_item");
    }

    #[test]
    fn test_plural_and_singular_touch_last_word() {
        let name = Name::new("UserAddress");
        assert_eq!(name.to_plural().to_snake(), "user_addresses");
        assert_eq!(
            Name::new("product_categories").to_singular().to_snake(),
            "product_category"
        );
        assert_eq!(Name::default().to_plural(), Name::default());
    }

    #[test]
    fn test_append_prepend() {
        let name = Name::new("user");
        assert_eq!(name.append("id").to_snake(), "user_id");
        assert_eq!(name.prepend("admin").to_pascal(), "AdminUser");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("Concert"), "concerts");
        assert_eq!(table_name("ConcertArtist"), "concert_artists");
        assert_eq!(table_name("Category"), "categories");
    }

    #[test]
    fn test_serde_as_string() {
        let name: Name = serde_json::from_str("\"createdAt\"").unwrap();
        assert_eq!(name.words(), ["created", "at"]);
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"created_at\"");
    }
}
