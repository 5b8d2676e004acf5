//! Typed values: inputs and outputs exchanged with functions.
//!
//! The engine does not interpret values itself; a `ValueCodec` converts between
//! native values and this representation.

use serde::{Deserialize, Serialize};

/// Format prefix of every value produced by the JSON codec.
pub const FORMAT_JSON: &str = "json";

/// A value tagged with its type (`json/string`, `json/object`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: Vec<u8>,
}

impl TypedValue {
    pub fn new(value_type: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            value_type: value_type.into(),
            value,
        }
    }

    /// Splits `format/kind`; a type without a slash has no format.
    pub fn format_and_kind(&self) -> (Option<&str>, &str) {
        match self.value_type.split_once('/') {
            Some((format, kind)) => (Some(format), kind),
            None => (None, self.value_type.as_str()),
        }
    }
}

/// Builds a `format/kind` type tag.
pub fn format_type(format: &str, kind: &str) -> String {
    format!("{format}/{kind}")
}
