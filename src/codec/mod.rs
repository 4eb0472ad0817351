//! Codec boundary: structured values to body text and back.
//!
//! The core never parses or prints JSON itself; it goes through a [`Codec`].
//! Both directions are single-shot over complete text.

mod json;

pub use json::JsonCodec;

use serde_json::Value;
use thiserror::Error;

use crate::routing::descriptor::{Shape, ShapeKind};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected}, found {found}")]
    ShapeMismatch {
        expected: ShapeKind,
        found: &'static str,
    },
}

pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String, CodecError>;

    fn decode(&self, text: &str, shape: &Shape) -> Result<Value, CodecError>;
}
