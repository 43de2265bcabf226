//! Service types
//!
//! Request options, the service builder, and the state both service
//! flavours share.

use super::url::build_url;
use crate::auth::AuthConfig;
use crate::envelope::{Envelope, Metadata, Record};
use crate::error::{Error, Result};
use crate::serialize::{Serializer, SerializerRegistry, DEFAULT_SERIALIZER};
use crate::transport::{Adapter, AdapterConfig, OutgoingRequest, Response};
use crate::types::{Method, Query, QueryValue};
use crate::value::Value;
use reqwest::header::ACCEPT;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Replaces the service's default urn; may be an absolute URL
    pub urn: Option<String>,
    /// Request body, encoded with the service serializer
    pub body: Option<Value>,
    /// Query parameters
    pub query: Query,
    /// Override the adapter's request timeout
    pub timeout: Option<Duration>,
    /// Request headers
    pub headers: BTreeMap<String, String>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the urn
    #[must_use]
    pub fn urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }

    /// Set the body
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Replace all query parameters
    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query
            .insert(key, QueryValue::Single(value.to_string()));
        self
    }

    /// Add a sequence query parameter, sent as repeated `key=value` pairs
    #[must_use]
    pub fn values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.query = self.query.values(key, values);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// URL and envelope state shared by `Service` and `BlockingService`
#[derive(Debug)]
pub(crate) struct ServiceCore {
    pub(crate) uri: String,
    pub(crate) urn: String,
    pub(crate) trailing_slash: bool,
    pub(crate) serializer: Arc<dyn Serializer>,
    pub(crate) envelope: Envelope,
}

impl ServiceCore {
    pub(crate) fn url(&self, path: &[&str], urn: Option<&str>) -> String {
        build_url(
            &self.uri,
            urn.unwrap_or(&self.urn),
            path,
            self.trailing_slash,
        )
    }

    /// Build the outgoing request for one call
    pub(crate) fn outgoing(
        &self,
        method: Method,
        path: &[&str],
        config: RequestConfig,
    ) -> Result<OutgoingRequest> {
        let url = self.url(path, config.urn.as_deref());
        let mut request = OutgoingRequest::new(method, url).with_query(config.query);
        request.body = config.body;
        request.timeout = config.timeout;
        for (name, value) in &config.headers {
            request.set_header(name, value)?;
        }
        Ok(request)
    }

    /// Set the `accept` header on the adapter's session
    pub(crate) fn announce<A: Adapter + ?Sized>(&self, adapter: &A) -> Result<()> {
        adapter.set_header(ACCEPT.as_str(), self.serializer.mime())
    }

    pub(crate) fn ingress(&self, response: Response) -> Result<Record> {
        self.envelope.ingress_filter(response)
    }
}

#[derive(Debug, Clone)]
enum SerializerChoice {
    Named(String),
    Instance(Arc<dyn Serializer>),
}

/// Builder for `Service` and `BlockingService`
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    uri: Option<String>,
    urn: String,
    trailing_slash: bool,
    serializer: SerializerChoice,
    registry: SerializerRegistry,
    auth: AuthConfig,
    adapter: AdapterConfig,
    envelope: Envelope,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self {
            uri: None,
            urn: String::new(),
            trailing_slash: true,
            serializer: SerializerChoice::Named(DEFAULT_SERIALIZER.to_string()),
            registry: SerializerRegistry::default(),
            auth: AuthConfig::None,
            adapter: AdapterConfig::default(),
            envelope: Envelope::default(),
        }
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base address, e.g. `https://api.example.com`
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Default urn appended to the uri, e.g. `/api/v1`
    #[must_use]
    pub fn urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = urn.into();
        self
    }

    #[must_use]
    pub fn trailing_slash(mut self, enabled: bool) -> Self {
        self.trailing_slash = enabled;
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Use a serializer registered under `name`
    #[must_use]
    pub fn serializer_name(mut self, name: impl Into<String>) -> Self {
        self.serializer = SerializerChoice::Named(name.into());
        self
    }

    /// Use a serializer instance directly
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = SerializerChoice::Instance(serializer);
        self
    }

    /// Registry consulted by `serializer_name`
    #[must_use]
    pub fn registry(mut self, registry: SerializerRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn adapter_config(mut self, config: AdapterConfig) -> Self {
        self.adapter = config;
        self
    }

    /// Replace the whole set of envelope getters
    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    #[must_use]
    pub fn data_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Response) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.envelope = self.envelope.with_data_getter(getter);
        self
    }

    #[must_use]
    pub fn meta_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Response) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.envelope = self.envelope.with_meta_getter(getter);
        self
    }

    #[must_use]
    pub fn next_page_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Metadata) -> Option<String> + Send + Sync + 'static,
    {
        self.envelope = self.envelope.with_next_page_getter(getter);
        self
    }

    pub(crate) fn resolve_serializer(&self) -> Result<Arc<dyn Serializer>> {
        match &self.serializer {
            SerializerChoice::Named(name) => self.registry.get(name),
            SerializerChoice::Instance(serializer) => Ok(Arc::clone(serializer)),
        }
    }

    pub(crate) fn adapter_parts(&self) -> (AdapterConfig, AuthConfig) {
        (self.adapter.clone(), self.auth.clone())
    }

    /// Validate and split off the shared service state
    pub(crate) fn into_core(self) -> Result<ServiceCore> {
        let serializer = self.resolve_serializer()?;
        let uri = self
            .uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| Error::config("Service uri is required"))?;
        ::url::Url::parse(&uri)?;

        Ok(ServiceCore {
            uri,
            urn: self.urn,
            trailing_slash: self.trailing_slash,
            serializer,
            envelope: self.envelope,
        })
    }
}
