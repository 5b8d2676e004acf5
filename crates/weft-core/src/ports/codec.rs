//! ValueCodec port - conversion between native values and `TypedValue`.

use serde_json::Value;

use crate::domain::{CodecError, TypedValue};

pub trait ValueCodec: Send + Sync {
    fn parse(&self, value: &Value) -> Result<TypedValue, CodecError>;

    fn format(&self, value: &TypedValue) -> Result<Value, CodecError>;
}
