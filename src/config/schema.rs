//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Interfaces
//! declared under `[[interfaces]]` convert into the same descriptors the
//! builder API produces.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::observability::correlation::DEFAULT_HEADER;
use crate::routing::descriptor::{
    ClassMapping, HttpVerb, InterfaceDescriptor, Mapping, MappingAttrs, MappingKind,
    MethodDescriptor, ParamDescriptor, ParamRole, ReturnShape, ShapeKind,
};

/// Root configuration for declared clients.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Prepended to relative request URLs by the bundled transport.
    pub base_url: Option<String>,

    /// Values for `${key}` placeholders in roots and paths.
    pub properties: BTreeMap<String, String>,

    /// Transport timeouts.
    pub timeouts: TimeoutConfig,

    /// Where uploaded parts are staged.
    pub staging: StagingConfig,

    /// Ambient correlation id propagation.
    pub correlation: CorrelationConfig,

    /// Compile every method when the client is built.
    pub eager_compile: bool,

    /// Fail calls on non-2xx responses instead of decoding the body.
    pub error_on_status: bool,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Declared interfaces.
    pub interfaces: Vec<InterfaceConfig>,
}

impl ClientConfig {
    pub fn interface(&self, name: &str) -> Option<&InterfaceConfig> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Timeouts applied by the bundled transport. Zero disables a timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Staging directory for uploaded parts.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StagingConfig {
    /// Defaults to `<system temp>/easyhttp`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Header carrying the ambient correlation id.
    pub header: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record call metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

/// A declared client interface.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfaceConfig {
    pub name: String,

    /// Root prefix; may contain placeholders.
    pub root: Option<String>,

    #[serde(default)]
    pub produces: Vec<String>,

    #[serde(default)]
    pub consumes: Vec<String>,

    /// Static headers as `key=value`.
    #[serde(default)]
    pub headers: Vec<String>,

    #[serde(default)]
    pub methods: Vec<MethodConfig>,
}

/// Mapping kind of a declared method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingConfig {
    Request,
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

/// A declared method. Without `mapping` it is not remote.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodConfig {
    pub name: String,

    pub mapping: Option<MappingConfig>,

    /// Verbs of a `request` mapping; the first one is used.
    #[serde(default)]
    pub verbs: Vec<HttpVerb>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub produces: Vec<String>,

    #[serde(default)]
    pub consumes: Vec<String>,

    #[serde(default)]
    pub headers: Vec<String>,

    #[serde(default)]
    pub params: Vec<ParamConfig>,

    #[serde(default)]
    pub returns: ReturnConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleConfig {
    Query,
    Header,
    Body,
    Path,
    Part,
}

/// A declared parameter. Without `role` the binder ignores it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamConfig {
    pub name: String,

    pub role: Option<RoleConfig>,

    /// Bound field name, if different from `name`.
    pub field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnConfig {
    Unit,
    Text,
    #[default]
    Json,
    Object,
    Array,
    String,
    Number,
    Bool,
}

impl InterfaceConfig {
    pub fn to_descriptor(&self) -> InterfaceDescriptor {
        InterfaceDescriptor {
            name: self.name.clone(),
            mapping: ClassMapping {
                root: self.root.clone(),
                produces: self.produces.clone(),
                consumes: self.consumes.clone(),
                headers: self.headers.clone(),
            },
            methods: self.methods.iter().map(MethodConfig::to_descriptor).collect(),
        }
    }
}

impl MethodConfig {
    pub fn to_descriptor(&self) -> MethodDescriptor {
        let mut method = MethodDescriptor::new(self.name.clone()).returns(self.returns.to_shape(&self.name));
        if let Some(kind) = self.mapping {
            let kind = match kind {
                MappingConfig::Request => MappingKind::Request {
                    verbs: self.verbs.clone(),
                },
                MappingConfig::Get => MappingKind::Get,
                MappingConfig::Post => MappingKind::Post,
                MappingConfig::Put => MappingKind::Put,
                MappingConfig::Delete => MappingKind::Delete,
                MappingConfig::Patch => MappingKind::Patch,
            };
            method = method.mapping(Mapping {
                kind,
                attrs: MappingAttrs {
                    paths: self.path.iter().cloned().collect(),
                    produces: self.produces.clone(),
                    consumes: self.consumes.clone(),
                    headers: self.headers.clone(),
                },
            });
        }
        for param in &self.params {
            method = method.param(param.to_descriptor());
        }
        method
    }
}

impl ParamConfig {
    pub fn to_descriptor(&self) -> ParamDescriptor {
        let field = self.field.clone();
        let role = match self.role {
            Some(RoleConfig::Query) => ParamRole::Query(field),
            Some(RoleConfig::Header) => ParamRole::Header(field),
            Some(RoleConfig::Body) => ParamRole::Body,
            Some(RoleConfig::Path) => ParamRole::Path(field),
            Some(RoleConfig::Part) => ParamRole::Part(field),
            None => return ParamDescriptor::new(self.name.clone()),
        };
        ParamDescriptor::new(self.name.clone()).role(role)
    }
}

impl ReturnConfig {
    fn to_shape(self, method: &str) -> ReturnShape {
        let kind = match self {
            ReturnConfig::Unit => return ReturnShape::Unit,
            ReturnConfig::Text => return ReturnShape::Text,
            ReturnConfig::Json => ShapeKind::Any,
            ReturnConfig::Object => ShapeKind::Object,
            ReturnConfig::Array => ShapeKind::Array,
            ReturnConfig::String => ShapeKind::String,
            ReturnConfig::Number => ShapeKind::Number,
            ReturnConfig::Bool => ShapeKind::Bool,
        };
        ReturnShape::shaped(format!("{method} reply"), kind)
    }
}
