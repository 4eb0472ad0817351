//! Response body → declared return shape.
//!
//! # Design Decisions
//! - The decoder takes ownership of the response; it is dropped on every exit
//!   path, decode failures included
//! - `Unit` returns never read the body
//! - An empty body decodes to `None` for structured shapes

use serde_json::Value;

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::http::transport::HttpResponse;
use crate::routing::descriptor::ReturnShape;

pub struct ResponseDecoder<'a> {
    codec: &'a dyn Codec,
    error_on_status: bool,
}

impl<'a> ResponseDecoder<'a> {
    pub fn new(codec: &'a dyn Codec, error_on_status: bool) -> Self {
        Self {
            codec,
            error_on_status,
        }
    }

    pub fn decode(&self, response: Box<dyn HttpResponse>, returns: &ReturnShape) -> Result<Option<Value>> {
        let status = response.status();
        let success = (200..300).contains(&status);

        if !success {
            if self.error_on_status {
                let body = response.text()?;
                return Err(Error::Status { status, body });
            }
            tracing::warn!(status, "Non-success response, decoding body anyway");
        }

        let shape = match returns {
            ReturnShape::Unit => return Ok(None),
            ReturnShape::Text => return Ok(Some(Value::String(response.text()?))),
            ReturnShape::Json(shape) => shape,
        };

        let body = response.text()?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match self.codec.decode(&body, shape) {
            Ok(value) => Ok(Some(value)),
            Err(source) => Err(Error::Decode {
                target: shape.to_string(),
                body,
                source,
            }),
        }
    }
}
