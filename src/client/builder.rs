//! Client construction.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::header::HeaderName;

use crate::client::proxy::{ClientInner, HttpClient};
use crate::codec::{Codec, JsonCodec};
use crate::config::{ClientConfig, PlaceholderResolver, PropertyResolver};
use crate::error::{Error, Result};
use crate::http::interceptor::{InterceptorChain, RequestInterceptor};
use crate::http::staging::Stager;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::observability::correlation::DEFAULT_HEADER;
use crate::routing::cache::TemplateCache;
use crate::routing::descriptor::InterfaceDescriptor;

/// Builder for [`HttpClient`].
///
/// Without an explicit transport the bundled [`ReqwestTransport`] is used;
/// without a resolver placeholders are looked up in the environment.
pub struct ClientBuilder {
    interface: InterfaceDescriptor,
    resolver: Option<Arc<dyn PlaceholderResolver>>,
    transport: Option<Arc<dyn Transport>>,
    codec: Arc<dyn Codec>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
    correlation_header: String,
    staging_dir: Option<PathBuf>,
    eager_compile: bool,
    error_on_status: bool,
    metrics_enabled: bool,
}

impl ClientBuilder {
    pub fn new(interface: InterfaceDescriptor) -> Self {
        Self {
            interface,
            resolver: None,
            transport: None,
            codec: Arc::new(JsonCodec),
            interceptors: Vec::new(),
            correlation_header: DEFAULT_HEADER.to_string(),
            staging_dir: None,
            eager_compile: false,
            error_on_status: false,
            metrics_enabled: true,
        }
    }

    /// A builder carrying every setting from `config`, including a reqwest
    /// transport with its base URL and timeouts.
    pub fn from_config(interface: InterfaceDescriptor, config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::new(interface)
            .resolver(PropertyResolver::new(config.properties.clone()))
            .transport(ReqwestTransport::from_config(config)?)
            .correlation_header(config.correlation.header.clone())
            .eager_compile(config.eager_compile)
            .error_on_status(config.error_on_status)
            .metrics(config.observability.metrics_enabled);
        if let Some(dir) = &config.staging.dir {
            builder = builder.staging_dir(dir.clone());
        }
        Ok(builder)
    }

    pub fn resolver(mut self, resolver: impl PlaceholderResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Shares one transport between several clients.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn correlation_header(mut self, header: impl Into<String>) -> Self {
        self.correlation_header = header.into();
        self
    }

    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn eager_compile(mut self, eager: bool) -> Self {
        self.eager_compile = eager;
        self
    }

    pub fn error_on_status(mut self, enabled: bool) -> Self {
        self.error_on_status = enabled;
        self
    }

    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let correlation_header = HeaderName::from_bytes(self.correlation_header.as_bytes())
            .map_err(|_| Error::InvalidHeader {
                name: self.correlation_header.clone(),
            })?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(PropertyResolver::default()));
        let root = self
            .interface
            .mapping
            .root
            .as_deref()
            .map(|root| resolver.resolve(root))
            .unwrap_or_default();
        let stager = self.staging_dir.map(Stager::new).unwrap_or_default();
        let chain = InterceptorChain::new(self.interceptors);

        tracing::info!(
            interface = %self.interface.name,
            root = %root,
            methods = self.interface.methods.len(),
            interceptors = chain.len(),
            staging_dir = %stager.dir().display(),
            "Client built"
        );

        let client = HttpClient::from_inner(ClientInner {
            interface: self.interface,
            root,
            resolver,
            transport,
            codec: self.codec,
            chain,
            correlation_header,
            stager,
            error_on_status: self.error_on_status,
            metrics_enabled: self.metrics_enabled,
            cache: TemplateCache::new(),
        });

        if self.eager_compile {
            client.compile_all();
        }
        Ok(client)
    }
}
