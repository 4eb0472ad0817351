//! Crate-wide error type.
//!
//! Each subsystem owns its own error enum (`TemplateError`, `TransportError`,
//! `CodecError`, `ConfigError`); this type is what a failed invocation returns.
//! There is no fallback value for any variant: a call either produces its
//! decoded reply or one of these.

use thiserror::Error;

use crate::codec::CodecError;
use crate::http::transport::TransportError;
use crate::routing::template::TemplateError;

/// Errors returned by [`HttpClient`](crate::HttpClient) invocations.
#[derive(Debug, Error)]
pub enum Error {
    /// The method's route template could not be compiled.
    /// Recurs on every call until the client is rebuilt.
    #[error("invalid route template for `{method}`: {source}")]
    Template {
        method: String,
        #[source]
        source: TemplateError,
    },

    /// The transport failed; propagated unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body could not be decoded into the declared shape.
    #[error("cannot decode response into {target}: {source}")]
    Decode {
        target: String,
        /// Raw response body, kept for diagnostics.
        body: String,
        #[source]
        source: CodecError,
    },

    /// An uploaded part could not be written to the staging directory.
    #[error("cannot stage upload `{filename}`: {source}")]
    Staging {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// The structured body could not be encoded.
    #[error("cannot encode request body: {0}")]
    Encode(#[source] CodecError),

    /// No method with this name is declared on the interface.
    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    /// Fewer arguments than the template's slots reference.
    #[error("expected at least {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    /// A header name or value is not valid HTTP.
    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    /// An argument cannot be used in the role it was bound to.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Non-success status while `error_on_status` is enabled.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
