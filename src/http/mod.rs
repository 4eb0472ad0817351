//! Request binding, transport and response decoding.
//!
//! # Data Flow
//! ```text
//! RouteTemplate + [Arg]
//!     → binder.rs      (path, headers, query/form/body/multipart)
//!     → staging.rs     (uploads written to disk for the call)
//!     → interceptor.rs (pre-sorted chain mutates the HttpRequest)
//!     → transport.rs   (blocking send, boxed response)
//!     → response.rs    (body → declared return shape, response released)
//! ```

pub mod args;
pub mod binder;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod staging;
pub mod transport;

pub use args::{Arg, Upload};
pub use binder::RequestBinder;
pub use interceptor::{HeaderInterceptor, InterceptorChain, LoggingInterceptor, RequestInterceptor};
pub use request::{HttpRequest, Part, PartContent, RequestBody};
pub use response::ResponseDecoder;
pub use staging::{StagedFiles, Stager};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
