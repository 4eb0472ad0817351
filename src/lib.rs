//! Declarative HTTP clients.
//!
//! An interface is described once as an [`InterfaceDescriptor`]: a class-level
//! root, one [`MethodDescriptor`] per method and a role tag per parameter. The
//! resulting [`HttpClient`] compiles each method into an immutable
//! [`RouteTemplate`] on first use and binds call arguments against it.
//!
//! ```text
//! client.invoke("get_user", &[42.into()])
//!     → routing::cache     (template lookup, compile on miss)
//!     → routing::compiler  (descriptor → RouteTemplate)
//!     → http::binder       (template + args → HttpRequest)
//!     → http::interceptor  (pre-sorted chain)
//!     → http::transport    (blocking send)
//!     → http::response     (body → declared return shape)
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;

pub use client::{ClientBuilder, HttpClient};
pub use codec::{Codec, CodecError, JsonCodec};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::args::{Arg, Upload};
pub use http::request::HttpRequest;
pub use routing::descriptor::{
    HttpVerb, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, ReturnShape, Shape,
    ShapeKind,
};
pub use routing::template::{CompiledRoute, RouteTemplate, TemplateError};
