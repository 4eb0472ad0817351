//! Method descriptor → route template compilation.
//!
//! # Responsibilities
//! - Pick the honored mapping (generic first, then GET/POST/PUT/DELETE/PATCH)
//! - Resolve config placeholders in the path, once
//! - Join the class root and the method path with exactly one slash
//! - Lift `{name}` placeholders into typed segments
//! - Classify each parameter into one role
//! - Collect static headers (class level first, method level overrides)
//!
//! Compilation is a pure function of the descriptor, the root and the
//! resolver, so concurrent compiles of one method agree.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::resolver::PlaceholderResolver;
use crate::routing::descriptor::{ClassMapping, MethodDescriptor, ParamRole};
use crate::routing::template::{
    CompiledRoute, HeaderSlot, PathPattern, RouteTemplate, Slot, TemplateError,
};

/// Joins a root prefix and a method path with exactly one separating slash.
pub fn join_root(root: &str, path: &str) -> String {
    if root.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return root.to_string();
    }
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Compiles the methods of one interface.
pub struct RouteCompiler<'a> {
    root: &'a str,
    class: &'a ClassMapping,
    resolver: &'a dyn PlaceholderResolver,
}

impl<'a> RouteCompiler<'a> {
    /// `root` must already be resolved.
    pub fn new(root: &'a str, class: &'a ClassMapping, resolver: &'a dyn PlaceholderResolver) -> Self {
        Self {
            root,
            class,
            resolver,
        }
    }

    pub fn compile(&self, method: &MethodDescriptor) -> CompiledRoute {
        match self.try_compile(method) {
            Ok(Some(template)) => CompiledRoute::Remote(template),
            Ok(None) => CompiledRoute::NotRemote,
            Err(err) => CompiledRoute::Invalid(err),
        }
    }

    fn try_compile(&self, method: &MethodDescriptor) -> Result<Option<RouteTemplate>, TemplateError> {
        let Some(mapping) = method.select_mapping() else {
            return Ok(None);
        };

        let path = mapping
            .attrs
            .paths
            .first()
            .map(|p| self.resolver.resolve(p))
            .unwrap_or_default();
        let path = PathPattern::parse(&join_root(self.root, &path))?;

        let mut static_headers = HeaderMap::new();
        apply_static_headers(
            &mut static_headers,
            &self.class.produces,
            &self.class.consumes,
            &self.class.headers,
        )?;
        apply_static_headers(
            &mut static_headers,
            &mapping.attrs.produces,
            &mapping.attrs.consumes,
            &mapping.attrs.headers,
        )?;

        let mut query_slots = Vec::new();
        let mut header_slots = Vec::new();
        let mut path_slots = BTreeMap::new();
        let mut body_index: Option<usize> = None;
        let mut multipart = false;

        for (index, param) in method.params.iter().enumerate() {
            let Some((role, field)) = param.classify() else {
                continue;
            };
            match role {
                ParamRole::Query(_) => query_slots.push(Slot {
                    name: field.to_string(),
                    index,
                }),
                ParamRole::Header(_) => {
                    let name = HeaderName::from_bytes(field.as_bytes())
                        .map_err(|_| TemplateError::InvalidHeader(field.to_string()))?;
                    header_slots.push(HeaderSlot { name, index });
                }
                ParamRole::Body => {
                    if let Some(previous) = body_index {
                        return Err(TemplateError::DuplicateBody {
                            first: method.params[previous].name.clone(),
                            second: param.name.clone(),
                        });
                    }
                    body_index = Some(index);
                }
                ParamRole::Path(_) => {
                    path_slots.insert(field.to_string(), index);
                }
                ParamRole::Part(_) => {
                    multipart = true;
                    query_slots.push(Slot {
                        name: field.to_string(),
                        index,
                    });
                }
            }
        }

        if multipart {
            if let Some(index) = body_index {
                return Err(TemplateError::BodyWithMultipart(method.params[index].name.clone()));
            }
        }
        for var in path.variables() {
            if !path_slots.contains_key(var) {
                return Err(TemplateError::UnboundPlaceholder(var.to_string()));
            }
        }
        for name in path_slots.keys() {
            if !path.variables().any(|var| var == name) {
                return Err(TemplateError::UnusedPathParameter(name.clone()));
            }
        }

        Ok(Some(RouteTemplate {
            verb: mapping.kind.verb(),
            path,
            static_headers,
            query_slots,
            header_slots,
            path_slots,
            body_index,
            multipart,
            returns: method.returns.clone(),
        }))
    }
}

fn apply_static_headers(
    headers: &mut HeaderMap,
    produces: &[String],
    consumes: &[String],
    pairs: &[String],
) -> Result<(), TemplateError> {
    if let Some(content_type) = consumes.first() {
        headers.insert(CONTENT_TYPE, header_value(content_type)?);
    }
    if !produces.is_empty() {
        headers.insert(ACCEPT, header_value(&produces.join(","))?);
    }
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| TemplateError::MalformedHeader(pair.clone()))?;
        let name = HeaderName::from_bytes(key.trim().as_bytes())
            .map_err(|_| TemplateError::InvalidHeader(key.trim().to_string()))?;
        headers.insert(name, header_value(value.trim())?);
    }
    Ok(())
}

fn header_value(value: &str) -> Result<HeaderValue, TemplateError> {
    HeaderValue::from_str(value).map_err(|_| TemplateError::InvalidHeader(value.to_string()))
}
