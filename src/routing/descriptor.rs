//! Declarative route metadata.
//!
//! Interfaces are declared up front as plain values: a class-level mapping,
//! one [`MethodDescriptor`] per method and a [`ParamRole`] per parameter.
//! The builder methods here and the TOML form in `config::schema` produce
//! the same descriptors.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::HttpClient;
use crate::error::Result;
use crate::http::args::Arg;

/// HTTP verbs a route can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
        }
    }

    /// Read-style verbs carry their fields in the query string instead of a form body.
    pub fn is_read(&self) -> bool {
        matches!(self, HttpVerb::Get)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes shared by every mapping kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingAttrs {
    /// Only the first path is honored.
    pub paths: Vec<String>,
    /// Sent as `Accept`, joined with `,`.
    pub produces: Vec<String>,
    /// First value sent as `Content-Type`.
    pub consumes: Vec<String>,
    /// Static headers as `key=value`.
    pub headers: Vec<String>,
}

impl MappingAttrs {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            ..Self::default()
        }
    }
}

/// Which mapping declared the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingKind {
    /// Verb-agnostic mapping; an empty verb list means GET.
    Request { verbs: Vec<HttpVerb> },
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl MappingKind {
    /// Scan position; the lowest present kind is the one honored.
    fn rank(&self) -> u8 {
        match self {
            MappingKind::Request { .. } => 0,
            MappingKind::Get => 1,
            MappingKind::Post => 2,
            MappingKind::Put => 3,
            MappingKind::Delete => 4,
            MappingKind::Patch => 5,
        }
    }

    pub fn verb(&self) -> HttpVerb {
        match self {
            MappingKind::Request { verbs } => verbs.first().copied().unwrap_or(HttpVerb::Get),
            MappingKind::Get => HttpVerb::Get,
            MappingKind::Post => HttpVerb::Post,
            MappingKind::Put => HttpVerb::Put,
            MappingKind::Delete => HttpVerb::Delete,
            MappingKind::Patch => HttpVerb::Patch,
        }
    }
}

impl From<HttpVerb> for MappingKind {
    fn from(verb: HttpVerb) -> Self {
        match verb {
            HttpVerb::Get => MappingKind::Get,
            HttpVerb::Post => MappingKind::Post,
            HttpVerb::Put => MappingKind::Put,
            HttpVerb::Delete => MappingKind::Delete,
            HttpVerb::Patch => MappingKind::Patch,
        }
    }
}

/// A routing declaration attached to a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub kind: MappingKind,
    pub attrs: MappingAttrs,
}

impl Mapping {
    pub fn new(kind: MappingKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            attrs: MappingAttrs::path(path),
        }
    }
}

/// Interface-level mapping: the root prefix plus headers shared by every method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMapping {
    pub root: Option<String>,
    pub produces: Vec<String>,
    pub consumes: Vec<String>,
    pub headers: Vec<String>,
}

/// Role tag attached to a parameter. The optional name overrides the
/// parameter name as the bound field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRole {
    Query(Option<String>),
    Header(Option<String>),
    Body,
    Path(Option<String>),
    Part(Option<String>),
}

impl ParamRole {
    /// Classification priority when a parameter carries several tags.
    fn rank(&self) -> u8 {
        match self {
            ParamRole::Query(_) => 0,
            ParamRole::Header(_) => 1,
            ParamRole::Body => 2,
            ParamRole::Path(_) => 3,
            ParamRole::Part(_) => 4,
        }
    }

    fn explicit_name(&self) -> Option<&str> {
        match self {
            ParamRole::Query(name)
            | ParamRole::Header(name)
            | ParamRole::Path(name)
            | ParamRole::Part(name) => name.as_deref().filter(|n| !n.is_empty()),
            ParamRole::Body => None,
        }
    }

    fn with_name(self, field: String) -> Self {
        match self {
            ParamRole::Query(_) => ParamRole::Query(Some(field)),
            ParamRole::Header(_) => ParamRole::Header(Some(field)),
            ParamRole::Path(_) => ParamRole::Path(Some(field)),
            ParamRole::Part(_) => ParamRole::Part(Some(field)),
            ParamRole::Body => ParamRole::Body,
        }
    }
}

/// One declared parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    pub roles: Vec<ParamRole>,
}

impl ParamDescriptor {
    /// A parameter with no role; the binder ignores it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
        }
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name).role(ParamRole::Query(None))
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name).role(ParamRole::Header(None))
    }

    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name).role(ParamRole::Body)
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name).role(ParamRole::Path(None))
    }

    pub fn part(name: impl Into<String>) -> Self {
        Self::new(name).role(ParamRole::Part(None))
    }

    pub fn role(mut self, role: ParamRole) -> Self {
        self.roles.push(role);
        self
    }

    /// Binds the most recently added role to `field` instead of the parameter name.
    pub fn named(mut self, field: impl Into<String>) -> Self {
        if let Some(role) = self.roles.pop() {
            self.roles.push(role.with_name(field.into()));
        }
        self
    }

    /// The role honored for this parameter and the field name it binds to.
    pub fn classify(&self) -> Option<(&ParamRole, &str)> {
        (0..=4).find_map(|rank| {
            self.roles.iter().find(|role| role.rank() == rank).map(|role| {
                let field = role.explicit_name().unwrap_or(self.name.as_str());
                (role, field)
            })
        })
    }
}

/// Top-level JSON kind a decoded reply must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Any,
    Object,
    Array,
    String,
    Number,
    Bool,
}

impl ShapeKind {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ShapeKind::Any => true,
            ShapeKind::Object => value.is_object(),
            ShapeKind::Array => value.is_array(),
            ShapeKind::String => value.is_string(),
            ShapeKind::Number => value.is_number(),
            ShapeKind::Bool => value.is_boolean(),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Any => "any value",
            ShapeKind::Object => "object",
            ShapeKind::Array => "array",
            ShapeKind::String => "string",
            ShapeKind::Number => "number",
            ShapeKind::Bool => "boolean",
        };
        f.write_str(name)
    }
}

/// Structured return shape: a display name plus the expected JSON kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub name: Cow<'static, str>,
    pub kind: ShapeKind,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Declared return shape of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnShape {
    /// No value; the response body is never read.
    Unit,
    /// The body as text, unchanged.
    Text,
    /// The body decoded through the codec.
    Json(Shape),
}

impl ReturnShape {
    /// Any JSON value, named after `T`.
    pub fn json<T: ?Sized>() -> Self {
        Self::shaped(std::any::type_name::<T>(), ShapeKind::Any)
    }

    pub fn object(name: impl Into<Cow<'static, str>>) -> Self {
        Self::shaped(name, ShapeKind::Object)
    }

    pub fn array(name: impl Into<Cow<'static, str>>) -> Self {
        Self::shaped(name, ShapeKind::Array)
    }

    pub fn shaped(name: impl Into<Cow<'static, str>>, kind: ShapeKind) -> Self {
        ReturnShape::Json(Shape {
            name: name.into(),
            kind,
        })
    }
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnShape::Unit => f.write_str("unit"),
            ReturnShape::Text => f.write_str("text"),
            ReturnShape::Json(shape) => write!(f, "{}", shape),
        }
    }
}

/// Body supplied by the interface itself; runs locally instead of being routed.
pub type DefaultBody = Arc<dyn Fn(&HttpClient, &[Arg]) -> Result<Option<Value>> + Send + Sync>;

/// One declared interface method.
#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub mappings: Vec<Mapping>,
    pub params: Vec<ParamDescriptor>,
    pub returns: ReturnShape,
    pub default_body: Option<DefaultBody>,
}

impl MethodDescriptor {
    /// A method without any mapping. Unless it gets one (or a default body)
    /// it compiles to a not-remote template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mappings: Vec::new(),
            params: Vec::new(),
            returns: ReturnShape::json::<Value>(),
            default_body: None,
        }
    }

    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).mapping(Mapping::new(MappingKind::Get, path))
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).mapping(Mapping::new(MappingKind::Post, path))
    }

    pub fn put(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).mapping(Mapping::new(MappingKind::Put, path))
    }

    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).mapping(Mapping::new(MappingKind::Delete, path))
    }

    pub fn patch(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name).mapping(Mapping::new(MappingKind::Patch, path))
    }

    /// Verb-agnostic mapping.
    pub fn request(name: impl Into<String>, verbs: Vec<HttpVerb>, path: impl Into<String>) -> Self {
        Self::new(name).mapping(Mapping::new(MappingKind::Request { verbs }, path))
    }

    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Adds an `Accept` value to the most recently added mapping.
    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        if let Some(mapping) = self.mappings.last_mut() {
            mapping.attrs.produces.push(media_type.into());
        }
        self
    }

    /// Adds a `Content-Type` value to the most recently added mapping.
    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        if let Some(mapping) = self.mappings.last_mut() {
            mapping.attrs.consumes.push(media_type.into());
        }
        self
    }

    /// Adds a `key=value` static header to the most recently added mapping.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        if let Some(mapping) = self.mappings.last_mut() {
            mapping.attrs.headers.push(header.into());
        }
        self
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, shape: ReturnShape) -> Self {
        self.returns = shape;
        self
    }

    pub fn with_default<F>(mut self, body: F) -> Self
    where
        F: Fn(&HttpClient, &[Arg]) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.default_body = Some(Arc::new(body));
        self
    }

    /// The mapping honored for this method. At most one is, by fixed kind priority.
    pub fn select_mapping(&self) -> Option<&Mapping> {
        (0..=5).find_map(|rank| self.mappings.iter().find(|m| m.kind.rank() == rank))
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("mappings", &self.mappings)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("default_body", &self.default_body.is_some())
            .finish()
    }
}

/// A declared client interface.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub mapping: ClassMapping,
    pub methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapping: ClassMapping::default(),
            methods: Vec::new(),
        }
    }

    /// Root prefix; may contain `${...}` placeholders.
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.mapping.root = Some(root.into());
        self
    }

    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        self.mapping.produces.push(media_type.into());
        self
    }

    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        self.mapping.consumes.push(media_type.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.mapping.headers.push(header.into());
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn find(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}
