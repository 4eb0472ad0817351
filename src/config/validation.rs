//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URLs and header names are well formed
//! - Detect duplicate interfaces and methods
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Route templates are left to the compiler

use std::collections::HashSet;

use reqwest::header::HeaderName;
use thiserror::Error;

use crate::config::schema::{ClientConfig, MappingConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base_url `{0}` is not an absolute URL")]
    InvalidBaseUrl(String),

    #[error("correlation header `{0}` is not a valid header name")]
    InvalidCorrelationHeader(String),

    #[error("interface name must not be empty")]
    EmptyInterfaceName,

    #[error("interface `{0}` is declared twice")]
    DuplicateInterface(String),

    #[error("interface `{interface}` declares method `{method}` twice")]
    DuplicateMethod { interface: String, method: String },

    #[error("method `{interface}.{method}` lists verbs without a request mapping")]
    VerbsWithoutRequestMapping { interface: String, method: String },
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base_url) = &config.base_url {
        if url::Url::parse(base_url).is_err() {
            errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
        }
    }

    if HeaderName::from_bytes(config.correlation.header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidCorrelationHeader(
            config.correlation.header.clone(),
        ));
    }

    let mut interfaces = HashSet::new();
    for interface in &config.interfaces {
        if interface.name.is_empty() {
            errors.push(ValidationError::EmptyInterfaceName);
        } else if !interfaces.insert(interface.name.as_str()) {
            errors.push(ValidationError::DuplicateInterface(interface.name.clone()));
        }

        let mut methods = HashSet::new();
        for method in &interface.methods {
            if !methods.insert(method.name.as_str()) {
                errors.push(ValidationError::DuplicateMethod {
                    interface: interface.name.clone(),
                    method: method.name.clone(),
                });
            }
            if !method.verbs.is_empty() && method.mapping != Some(MappingConfig::Request) {
                errors.push(ValidationError::VerbsWithoutRequestMapping {
                    interface: interface.name.clone(),
                    method: method.name.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{InterfaceConfig, MethodConfig, ReturnConfig};

    fn method(name: &str) -> MethodConfig {
        MethodConfig {
            name: name.into(),
            mapping: Some(MappingConfig::Get),
            verbs: Vec::new(),
            path: Some("/x".into()),
            produces: Vec::new(),
            consumes: Vec::new(),
            headers: Vec::new(),
            params: Vec::new(),
            returns: ReturnConfig::Json,
        }
    }

    fn interface(name: &str, methods: Vec<MethodConfig>) -> InterfaceConfig {
        InterfaceConfig {
            name: name.into(),
            root: None,
            produces: Vec::new(),
            consumes: Vec::new(),
            headers: Vec::new(),
            methods,
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = ClientConfig::default();
        config.base_url = Some("http://localhost:8080".into());
        config.interfaces.push(interface("users", vec![method("get")]));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.correlation.header = "bad header".into();

        let mut verbs = method("save");
        verbs.verbs = vec![crate::routing::descriptor::HttpVerb::Post];
        config.interfaces.push(interface("users", vec![method("get"), method("get"), verbs]));
        config.interfaces.push(interface("users", Vec::new()));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidCorrelationHeader("bad header".into()),
                ValidationError::DuplicateMethod {
                    interface: "users".into(),
                    method: "get".into()
                },
                ValidationError::VerbsWithoutRequestMapping {
                    interface: "users".into(),
                    method: "save".into()
                },
                ValidationError::DuplicateInterface("users".into()),
            ]
        );
    }
}
