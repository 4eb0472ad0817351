//! Transport boundary and the bundled reqwest transport.
//!
//! # Responsibilities
//! - Define the blocking [`Transport`] seam the client sends through
//! - Map an [`HttpRequest`] onto reqwest: query, form, structured and
//!   multipart bodies
//! - Prepend the configured base URL to relative request URLs
//!
//! # Design Decisions
//! - One blocking call per request; no retries here or above
//! - Responses are boxed trait objects; dropping the box releases the
//!   connection, so the decoder owns release on every path

use std::io;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;
use crate::http::request::{HttpRequest, PartContent, RequestBody};
use crate::routing::compiler::join_root;
use crate::routing::descriptor::HttpVerb;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// A received response. Dropping it releases the underlying resources.
pub trait HttpResponse: Send {
    fn status(&self) -> u16;

    fn headers(&self) -> &HeaderMap;

    /// Consumes the response and reads the whole body as text.
    fn text(self: Box<Self>) -> Result<String, TransportError>;
}

/// Executes one bound request, blocking until the response head arrives.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<Box<dyn HttpResponse>, TransportError>;
}

impl From<HttpVerb> for reqwest::Method {
    fn from(verb: HttpVerb) -> Self {
        match verb {
            HttpVerb::Get => reqwest::Method::GET,
            HttpVerb::Post => reqwest::Method::POST,
            HttpVerb::Put => reqwest::Method::PUT,
            HttpVerb::Delete => reqwest::Method::DELETE,
            HttpVerb::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self::with_client(Client::builder().build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Builds a client with the configured timeouts and base URL.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let timeouts = &config.timeouts;
        let mut builder = Client::builder()
            .timeout((timeouts.request_secs > 0).then(|| Duration::from_secs(timeouts.request_secs)));
        if timeouts.connect_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(timeouts.connect_secs));
        }

        let mut transport = Self::with_client(builder.build()?);
        if let Some(base_url) = &config.base_url {
            transport = transport.base_url(base_url)?;
        }
        Ok(transport)
    }

    pub fn base_url(mut self, base_url: &str) -> Result<Self, TransportError> {
        self.base_url = Some(parse_url(base_url)?);
        Ok(self)
    }

    /// Absolute URLs are used as-is; relative ones are joined to the base URL.
    pub fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => parse_url(&join_root(base.as_str(), url)),
                None => Err(TransportError::InvalidUrl {
                    url: url.to_string(),
                    reason: "relative URL and no base URL configured".to_string(),
                }),
            },
            Err(e) => Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<Box<dyn HttpResponse>, TransportError> {
        let url = self.resolve_url(&request.url)?;
        let HttpRequest {
            verb,
            mut headers,
            query,
            body,
            ..
        } = request;

        let mut builder = self.client.request(verb.into(), url.clone());
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            RequestBody::None => builder.headers(headers),
            RequestBody::Form(fields) => builder.headers(headers).form(&fields),
            RequestBody::Structured(text) => builder.headers(headers).body(text),
            RequestBody::Multipart(parts) => {
                // The form supplies its own boundary.
                headers.remove(CONTENT_TYPE);
                let mut form = multipart::Form::new();
                for part in parts {
                    form = match part.content {
                        PartContent::Text(text) => form.text(part.name, text),
                        PartContent::File(path) => form.file(part.name, path)?,
                        PartContent::Staged {
                            path,
                            filename,
                            content_type,
                        } => {
                            let mut file = multipart::Part::file(path)?.file_name(filename);
                            if let Some(content_type) = content_type {
                                file = file.mime_str(&content_type)?;
                            }
                            form.part(part.name, file)
                        }
                    };
                }
                builder.headers(headers).multipart(form)
            }
        };

        tracing::trace!(method = %verb, url = %url, "Sending request");
        let response = builder.send()?;
        Ok(Box::new(ReqwestResponse {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            inner: response,
        }))
    }
}

struct ReqwestResponse {
    status: u16,
    headers: HeaderMap,
    inner: Response,
}

impl HttpResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn text(self: Box<Self>) -> Result<String, TransportError> {
        Ok(self.inner.text()?)
    }
}

fn parse_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|e| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
