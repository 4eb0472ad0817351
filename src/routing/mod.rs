//! Routing subsystem: declarative metadata and its compiled form.
//!
//! # Data Flow
//! ```text
//! MethodDescriptor (mapping, params, return shape)
//!     → compiler.rs (select mapping, resolve placeholders, join root,
//!                    parse {name} slots, classify parameters)
//!     → RouteTemplate | NotRemote | Invalid(TemplateError)
//!     → cache.rs (one surviving Arc per method)
//! ```
//!
//! # Design Decisions
//! - Templates are compiled once and never mutated afterwards
//! - Config placeholders are resolved at compile time, never per call
//! - Path variables are typed segments, not in-band marker text
//! - Invalid templates are cached too, so the same error recurs on every call

pub mod cache;
pub mod compiler;
pub mod descriptor;
pub mod template;

pub use cache::TemplateCache;
pub use compiler::{join_root, RouteCompiler};
pub use descriptor::{
    ClassMapping, HttpVerb, InterfaceDescriptor, Mapping, MappingAttrs, MappingKind,
    MethodDescriptor, ParamDescriptor, ParamRole, ReturnShape, Shape, ShapeKind,
};
pub use template::{CompiledRoute, HeaderSlot, PathPattern, RouteTemplate, Segment, Slot, TemplateError};
