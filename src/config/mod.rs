//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → ClientBuilder::from_config / HttpClient::from_config
//!
//! properties table + process environment
//!     → resolver.rs (${key} / ${key:default})
//!     → used by the route compiler, at compile time only
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Route templates are not checked here; their errors surface on first call

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use resolver::{PlaceholderResolver, PropertyResolver};
pub use schema::ClientConfig;
pub use schema::InterfaceConfig;
pub use schema::MethodConfig;
pub use schema::ParamConfig;
