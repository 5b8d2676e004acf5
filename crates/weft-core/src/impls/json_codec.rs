//! JSON-backed typed values.

use serde_json::Value;

use crate::domain::typed_value::{format_type, FORMAT_JSON};
use crate::domain::{CodecError, TypedValue};
use crate::ports::ValueCodec;

const TYPE_STRING: &str = "string";
const TYPE_OBJECT: &str = "object";
const TYPE_ARRAY: &str = "array";
const TYPE_BOOL: &str = "bool";
const TYPE_INT: &str = "int";
const TYPE_FLOAT: &str = "float";
const TYPE_NULL: &str = "null";

const JSON_TYPES: [&str; 7] = [
    TYPE_STRING,
    TYPE_OBJECT,
    TYPE_ARRAY,
    TYPE_BOOL,
    TYPE_INT,
    TYPE_FLOAT,
    TYPE_NULL,
];

/// Codec storing a value as its JSON encoding, tagged `json/<kind>`.
///
/// The kind is kept next to the bytes so expressions can tell strings from
/// arrays without decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }

    fn kind_of(value: &Value) -> &'static str {
        match value {
            Value::Null => TYPE_NULL,
            Value::Bool(_) => TYPE_BOOL,
            Value::Number(n) if n.is_f64() => TYPE_FLOAT,
            Value::Number(_) => TYPE_INT,
            Value::String(_) => TYPE_STRING,
            Value::Array(_) => TYPE_ARRAY,
            Value::Object(_) => TYPE_OBJECT,
        }
    }

    fn is_json_value(value: &TypedValue) -> bool {
        match value.format_and_kind() {
            (Some(FORMAT_JSON), kind) => JSON_TYPES.contains(&kind),
            _ => false,
        }
    }
}

impl ValueCodec for JsonCodec {
    fn parse(&self, value: &Value) -> Result<TypedValue, CodecError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(TypedValue::new(
            format_type(FORMAT_JSON, Self::kind_of(value)),
            bytes,
        ))
    }

    fn format(&self, value: &TypedValue) -> Result<Value, CodecError> {
        if !Self::is_json_value(value) {
            return Err(CodecError::Unsupported(format!(
                "'{}' is not a JSON type",
                value.value_type
            )));
        }
        Ok(serde_json::from_slice(&value.value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("wfi-1"), "json/string")]
    #[case(json!({"a": 1}), "json/object")]
    #[case(json!([1, 2]), "json/array")]
    #[case(json!(true), "json/bool")]
    #[case(json!(42), "json/int")]
    #[case(json!(-7), "json/int")]
    #[case(json!(1.5), "json/float")]
    #[case(json!(null), "json/null")]
    fn values_are_tagged_by_kind(#[case] value: Value, #[case] expected: &str) {
        let typed = JsonCodec.parse(&value).unwrap();
        assert_eq!(typed.value_type, expected);
        assert_eq!(JsonCodec.format(&typed).unwrap(), value);
    }

    #[test]
    fn non_json_values_cannot_be_formatted() {
        let raw = TypedValue::new("bytes", vec![0xff]);
        assert!(matches!(
            JsonCodec.format(&raw),
            Err(CodecError::Unsupported(_))
        ));
    }
}
