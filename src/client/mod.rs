//! Live client instances.
//!
//! # Data Flow
//! ```text
//! ClientBuilder::build
//!     → resolve the class root once
//!     → sort the interceptor chain once
//!     → optionally compile every method
//!
//! HttpClient::invoke(method, args)
//!     → default body?        run it locally
//!     → TemplateCache        compile on first use
//!     → not remote?          None, transport untouched
//!     → invalid?             Error::Template, every call
//!     → bind, intercept, send, decode
//! ```

mod builder;
mod proxy;

pub use builder::ClientBuilder;
pub use proxy::HttpClient;
