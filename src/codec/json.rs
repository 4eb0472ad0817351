use serde_json::Value;

use crate::codec::{Codec, CodecError};
use crate::routing::descriptor::Shape;

/// `serde_json` codec. Decoded values must match the shape's top-level kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, text: &str, shape: &Shape) -> Result<Value, CodecError> {
        let value: Value = serde_json::from_str(text)?;
        if !shape.kind.accepts(&value) {
            return Err(CodecError::ShapeMismatch {
                expected: shape.kind,
                found: kind_name(&value),
            });
        }
        Ok(value)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::descriptor::ShapeKind;
    use serde_json::json;

    fn shape(kind: ShapeKind) -> Shape {
        Shape {
            name: "Test".into(),
            kind,
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!(JsonCodec.encode(&json!({"a": 1})).unwrap(), r#"{"a":1}"#);
        assert_eq!(JsonCodec.encode(&json!({})).unwrap(), "{}");
    }

    #[test]
    fn test_decode_checks_shape() {
        let value = JsonCodec.decode(r#"{"id": 7}"#, &shape(ShapeKind::Object)).unwrap();
        assert_eq!(value["id"], 7);

        let err = JsonCodec.decode("[1, 2]", &shape(ShapeKind::Object)).unwrap_err();
        assert_eq!(err.to_string(), "expected object, found array");

        assert!(JsonCodec.decode("[1, 2]", &shape(ShapeKind::Any)).is_ok());
    }

    #[test]
    fn test_decode_syntax_error() {
        let err = JsonCodec.decode("{not json", &shape(ShapeKind::Any)).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
