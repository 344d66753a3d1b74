//! Record - opaque gateway row
//!
//! A mapping from field name to JSON primitive. The core never assumes a
//! schema beyond the accessors below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Record id as text (numeric ids are stringified)
    pub fn id(&self) -> Option<String> {
        self.text("id")
    }

    /// String view of a field; numbers and booleans are stringified
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Numeric view of a field; numeric strings are parsed
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn flag(&self, field: &str) -> bool {
        match self.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_id_is_stringified() {
        let r = Record::new().with("id", 7);
        assert_eq!(r.id().as_deref(), Some("7"));
    }

    #[test]
    fn test_number_parses_strings() {
        let r = Record::new().with("price", "40.5").with("qty", json!(3));
        assert_eq!(r.number("price"), Some(40.5));
        assert_eq!(r.number("qty"), Some(3.0));
        assert_eq!(r.number("missing"), None);
    }

    #[test]
    fn test_null_is_absent() {
        let r = Record::new().with("location", Value::Null);
        assert!(r.get("location").is_none());
        assert!(!r.flag("location"));
    }
}
