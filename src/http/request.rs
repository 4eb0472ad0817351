//! Fully bound request description handed to the transport.
//!
//! # Design Decisions
//! - Transport-neutral: the bundled reqwest transport and test doubles read
//!   the same value
//! - Body kinds are exclusive: none, form fields, structured text or
//!   multipart parts
//! - Staged upload files are referenced by path; their lifetime is owned by
//!   the call, not by this value

use std::path::PathBuf;

use reqwest::header::HeaderMap;

use crate::routing::descriptor::HttpVerb;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub verb: HttpVerb,
    /// Root and path joined, placeholders substituted. May be relative.
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All query values bound under `name`.
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    None,
    Form(Vec<(String, String)>),
    /// Codec output, sent as the whole payload.
    Structured(String),
    Multipart(Vec<Part>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    Text(String),
    /// An existing file supplied by the caller.
    File(PathBuf),
    /// An upload written to the staging directory for this call.
    Staged {
        path: PathBuf,
        filename: String,
        content_type: Option<String>,
    },
}
