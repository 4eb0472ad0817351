//! The invocation proxy.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use reqwest::header::HeaderName;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::builder::ClientBuilder;
use crate::codec::{Codec, CodecError};
use crate::config::{ClientConfig, InterfaceConfig, PlaceholderResolver};
use crate::error::{Error, Result};
use crate::http::args::Arg;
use crate::http::binder::RequestBinder;
use crate::http::interceptor::InterceptorChain;
use crate::http::response::ResponseDecoder;
use crate::http::staging::{StagedFiles, Stager};
use crate::http::transport::Transport;
use crate::observability::metrics;
use crate::routing::cache::TemplateCache;
use crate::routing::compiler::RouteCompiler;
use crate::routing::descriptor::{InterfaceDescriptor, MethodDescriptor};
use crate::routing::template::{CompiledRoute, RouteTemplate};

pub(crate) struct ClientInner {
    pub(crate) interface: InterfaceDescriptor,
    pub(crate) root: String,
    pub(crate) resolver: Arc<dyn PlaceholderResolver>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) chain: InterceptorChain,
    pub(crate) correlation_header: HeaderName,
    pub(crate) stager: Stager,
    pub(crate) error_on_status: bool,
    pub(crate) metrics_enabled: bool,
    pub(crate) cache: TemplateCache,
}

/// A live client for one declared interface.
///
/// Cheap to clone; clones share the template cache, the transport and the
/// interceptor chain. Equality, hashing and formatting are answered locally
/// and never reach the transport: two handles are equal exactly when they
/// come from the same `build()`.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl HttpClient {
    pub fn builder(interface: InterfaceDescriptor) -> ClientBuilder {
        ClientBuilder::new(interface)
    }

    /// Builds a client for one `[[interfaces]]` entry of `config`.
    pub fn from_config(interface: &InterfaceConfig, config: &ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(interface.to_descriptor(), config)?.build()
    }

    pub(crate) fn from_inner(inner: ClientInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.inner.interface
    }

    /// The resolved class root.
    pub fn root(&self) -> &str {
        &self.inner.root
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.inner.cache
    }

    /// The compiled route for `method`, compiling it on first use.
    pub fn route(&self, method: &str) -> Result<Arc<CompiledRoute>> {
        let descriptor = self.method(method)?;
        Ok(self.compiled(descriptor))
    }

    pub(crate) fn compile_all(&self) {
        for method in &self.inner.interface.methods {
            self.compiled(method);
        }
    }

    /// Invokes `method` with positional `args`.
    ///
    /// Returns `None` for methods without a mapping, for unit returns and
    /// for empty response bodies.
    pub fn invoke(&self, method: &str, args: &[Arg]) -> Result<Option<Value>> {
        let descriptor = self.method(method)?;
        if let Some(body) = &descriptor.default_body {
            return body(self, args);
        }

        let route = self.compiled(descriptor);
        let template = match route.as_ref() {
            CompiledRoute::Remote(template) => template,
            CompiledRoute::NotRemote => {
                tracing::trace!(method, "Method is not remote, skipping transport");
                return Ok(None);
            }
            CompiledRoute::Invalid(err) => {
                return Err(Error::Template {
                    method: method.to_string(),
                    source: err.clone(),
                })
            }
        };

        let start = Instant::now();
        let result = self.dispatch(method, template, args);
        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => {
                tracing::warn!(
                    interface = %self.inner.interface.name,
                    method,
                    error = %err,
                    "Call failed"
                );
                outcome_label(err)
            }
        };
        if self.inner.metrics_enabled {
            metrics::record_call(&self.inner.interface.name, method, outcome, start);
        }
        result
    }

    /// Invokes `method` and converts the reply into `T`.
    pub fn call<T: DeserializeOwned>(&self, method: &str, args: &[Arg]) -> Result<Option<T>> {
        let Some(value) = self.invoke(method, args)? else {
            return Ok(None);
        };
        T::deserialize(&value).map(Some).map_err(|e| Error::Decode {
            target: std::any::type_name::<T>().to_string(),
            body: value.to_string(),
            source: CodecError::Json(e),
        })
    }

    fn method(&self, name: &str) -> Result<&MethodDescriptor> {
        self.inner
            .interface
            .find(name)
            .ok_or_else(|| Error::UnknownMethod(name.to_string()))
    }

    fn compiled(&self, method: &MethodDescriptor) -> Arc<CompiledRoute> {
        let inner = &self.inner;
        inner.cache.get_or_compile(&method.name, || {
            let compiler = RouteCompiler::new(&inner.root, &inner.interface.mapping, inner.resolver.as_ref());
            let route = compiler.compile(method);
            let outcome = match &route {
                CompiledRoute::Remote(_) => "remote",
                CompiledRoute::NotRemote => "not_remote",
                CompiledRoute::Invalid(err) => {
                    tracing::warn!(
                        interface = %inner.interface.name,
                        method = %method.name,
                        error = %err,
                        "Invalid route template"
                    );
                    "invalid"
                }
            };
            tracing::debug!(
                interface = %inner.interface.name,
                method = %method.name,
                route = %route,
                "Compiled route"
            );
            if inner.metrics_enabled {
                metrics::record_compile(&inner.interface.name, outcome);
            }
            route
        })
    }

    fn dispatch(&self, method: &str, template: &RouteTemplate, args: &[Arg]) -> Result<Option<Value>> {
        let inner = &self.inner;
        // Declared first so staged uploads outlive the response.
        let mut staged = StagedFiles::new();

        let binder = RequestBinder::new(inner.codec.as_ref(), &inner.stager, &inner.correlation_header);
        let mut request = binder.bind(template, args, &mut staged)?;
        inner.chain.apply(&mut request);

        tracing::debug!(
            interface = %inner.interface.name,
            method,
            verb = %request.verb,
            url = %request.url,
            "Dispatching request"
        );
        let response = inner.transport.execute(request)?;

        ResponseDecoder::new(inner.codec.as_ref(), inner.error_on_status).decode(response, &template.returns)
    }
}

fn outcome_label(err: &Error) -> &'static str {
    match err {
        Error::Transport(_) => "transport_error",
        Error::Decode { .. } => "decode_error",
        Error::Status { .. } => "status_error",
        Error::Staging { .. } => "staging_error",
        _ => "bind_error",
    }
}

impl PartialEq for HttpClient {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for HttpClient {}

impl Hash for HttpClient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.inner), state);
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("interface", &self.inner.interface.name)
            .field("root", &self.inner.root)
            .field("compiled", &self.inner.cache.len())
            .field("interceptors", &self.inner.chain)
            .finish()
    }
}

impl fmt::Display for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} client", self.inner.interface.name)?;
        if !self.inner.root.is_empty() {
            write!(f, " at {}", self.inner.root)?;
        }
        Ok(())
    }
}
