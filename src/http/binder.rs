//! Route template + call arguments → request description.
//!
//! # Responsibilities
//! - Substitute path variables with the textual form of their arguments
//! - Apply static headers, then per-parameter headers, then the ambient
//!   correlation id when no header of that name is set
//! - Choose the body kind: multipart when any part slot exists, otherwise a
//!   structured body when a body slot exists, otherwise query fields for
//!   reads and form fields for everything else; no fields means no body
//! - Stage uploads for multipart parts

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::{Map, Value};

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::http::args::{Arg, Field};
use crate::http::request::{HttpRequest, Part, PartContent, RequestBody};
use crate::http::staging::{StagedFiles, Stager};
use crate::observability::correlation;
use crate::routing::template::RouteTemplate;

const JSON: &str = "application/json";

pub struct RequestBinder<'a> {
    codec: &'a dyn Codec,
    stager: &'a Stager,
    correlation_header: &'a HeaderName,
}

impl<'a> RequestBinder<'a> {
    pub fn new(codec: &'a dyn Codec, stager: &'a Stager, correlation_header: &'a HeaderName) -> Self {
        Self {
            codec,
            stager,
            correlation_header,
        }
    }

    /// Binds `args` against `template`. Uploads are staged into `staged`,
    /// which the caller keeps alive until the request has been sent.
    pub fn bind(
        &self,
        template: &RouteTemplate,
        args: &[Arg],
        staged: &mut StagedFiles,
    ) -> Result<HttpRequest> {
        let expected = template.arity();
        if args.len() < expected {
            return Err(Error::Arity {
                expected,
                actual: args.len(),
            });
        }

        let url = template.path.render(|name| {
            template
                .path_slots
                .get(name)
                .map(|&index| args[index].to_text())
                .unwrap_or_default()
        });

        let mut headers = template.static_headers.clone();
        for slot in &template.header_slots {
            let arg = &args[slot.index];
            if arg.is_null() {
                continue;
            }
            let value = HeaderValue::from_str(&arg.to_text()).map_err(|_| Error::InvalidHeader {
                name: slot.name.to_string(),
            })?;
            headers.insert(slot.name.clone(), value);
        }
        if !headers.contains_key(self.correlation_header) {
            if let Some(id) = correlation::current() {
                let value = HeaderValue::from_str(&id).map_err(|_| Error::InvalidHeader {
                    name: self.correlation_header.to_string(),
                })?;
                headers.insert(self.correlation_header.clone(), value);
            }
        }

        let mut fields = Vec::new();
        for slot in &template.query_slots {
            args[slot.index].expand(&slot.name, &mut fields);
        }

        let mut query = Vec::new();
        let body = if template.multipart {
            let mut parts = Vec::with_capacity(fields.len());
            for (name, field) in fields {
                let content = match field {
                    Field::File(path) => PartContent::File(path.to_path_buf()),
                    Field::Upload(upload) => PartContent::Staged {
                        path: self.stager.stage(upload, staged)?,
                        filename: upload.filename.clone(),
                        content_type: upload.content_type.clone(),
                    },
                    other => PartContent::Text(other.to_text()),
                };
                parts.push(Part {
                    name: name.to_string(),
                    content,
                });
            }
            RequestBody::Multipart(parts)
        } else if let Some(index) = template.body_index {
            query = text_fields(fields);
            let payload = match &args[index] {
                Arg::Null | Arg::Value(Value::Null) => self.codec.encode(&Value::Object(Map::new())),
                Arg::Value(value) => self.codec.encode(value),
                Arg::File(_) | Arg::Upload(_) => {
                    return Err(Error::InvalidArgument(
                        "files can only be sent as multipart parts".to_string(),
                    ))
                }
            }
            .map_err(Error::Encode)?;
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            }
            RequestBody::Structured(payload)
        } else if template.verb.is_read() {
            query = text_fields(fields);
            RequestBody::None
        } else if fields.is_empty() {
            RequestBody::None
        } else {
            RequestBody::Form(text_fields(fields))
        };

        Ok(HttpRequest {
            verb: template.verb,
            url,
            headers,
            query,
            body,
        })
    }
}

fn text_fields(fields: Vec<(&str, Field<'_>)>) -> Vec<(String, String)> {
    fields
        .into_iter()
        .map(|(name, field)| (name.to_string(), field.to_text()))
        .collect()
}
