//! Ordered `application/x-www-form-urlencoded` request bodies.

use std::fmt::Display;

use serde::Serialize;

use crate::error::{ApiError, Result};

/// Flat, ordered list of form fields sent to one endpoint.
///
/// Fields are encoded in insertion order. Absent values never reach the
/// list, so nothing is ever encoded as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl Display) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn optional_field<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Serialize `params` to JSON and carry it as a single `params` field.
    pub fn params<P: Serialize>(self, params: &P) -> Result<Self> {
        let json =
            serde_json::to_string(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.field("params", json))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Percent-encode every key and value and join the pairs with `&`.
    ///
    /// Only `A-Z a-z 0-9 - . _ ~` stay literal, so `! * ' ( )` are escaped
    /// too. Form decoders read both spellings the same way.
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_encodes_to_empty_string() {
        assert_eq!(FormBody::new().encode(), "");
    }

    #[test]
    fn fields_keep_insertion_order() {
        let body = FormBody::new()
            .field("username", "username")
            .field("password", "password");
        assert_eq!(body.encode(), "username=username&password=password");
    }

    #[test]
    fn absent_optional_field_is_omitted() {
        let body = FormBody::new()
            .optional_field::<u32>("setID", None)
            .optional_field("userHash", Some("abc"));
        assert_eq!(body.encode(), "userHash=abc");
    }

    #[test]
    fn empty_string_is_still_sent() {
        let body = FormBody::new().field("userHash", "");
        assert_eq!(body.encode(), "userHash=");
    }

    #[test]
    fn values_are_percent_encoded() {
        let body = FormBody::new().field("query", "star wars & co/ 100%");
        assert_eq!(body.encode(), "query=star%20wars%20%26%20co%2F%20100%25");
    }

    #[test]
    fn reserved_punctuation_is_escaped() {
        let body = FormBody::new().field("query", "Luke Skywalker's (UCS)!");
        assert_eq!(
            body.encode(),
            "query=Luke%20Skywalker%27s%20%28UCS%29%21"
        );
    }

    #[test]
    fn params_are_json_encoded_into_one_field() {
        let body = FormBody::new()
            .params(&json!({ "wanted": 1 }))
            .unwrap()
            .field("userHash", "hash");
        assert_eq!(body.get("params"), Some(r#"{"wanted":1}"#));
        assert_eq!(
            body.encode(),
            "params=%7B%22wanted%22%3A1%7D&userHash=hash"
        );
    }
}
