//! Transport types
//!
//! The request an adapter sends, the uniform response record it returns,
//! and the adapter configuration.

use super::rate_limit::RateLimiterConfig;
use crate::error::{Error, Result};
use crate::serialize::Serializer;
use crate::types::{Method, Query};
use crate::value::Value;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// Adapter Configuration
// ============================================================================

/// Configuration shared by the blocking and cooperative adapters
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Default timeout for a whole request, used when a call sets none
    pub request_timeout: Duration,
    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// User agent string
    pub user_agent: String,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// Client side rate limiting
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            user_agent: format!("syndicate/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
            rate_limit: None,
        }
    }
}

impl AdapterConfig {
    /// Create a new config builder
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }
}

/// Builder for adapter config
#[derive(Default)]
pub struct AdapterConfigBuilder {
    config: AdapterConfig,
}

impl AdapterConfigBuilder {
    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the default request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the idle connection pool size per host
    pub fn pool_max_idle_per_host(mut self, size: usize) -> Self {
        self.config.pool_max_idle_per_host = size;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Build the config
    pub fn build(self) -> AdapterConfig {
        self.config
    }
}

// ============================================================================
// Outgoing Request
// ============================================================================

/// A request about to be sent by an adapter
///
/// Authentication strategies mutate `headers` before the adapter sends it.
#[derive(Debug, Clone, Default)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Query,
    pub body: Option<Value>,
    /// Overrides the adapter's request timeout
    pub timeout: Option<Duration>,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Insert a header, replacing any previous value
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_header(name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append `name=value` pairs to the `Cookie` header
    pub fn add_cookies(&mut self, cookies: &str) -> Result<()> {
        if cookies.is_empty() {
            return Ok(());
        }
        let merged = match self.headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
            Some(existing) if !existing.is_empty() => format!("{existing}; {cookies}"),
            _ => cookies.to_string(),
        };
        let value = HeaderValue::from_str(&merged).map_err(|e| Error::invalid_header("cookie", e))?;
        self.headers.insert(COOKIE, value);
        Ok(())
    }

    /// Encode the body with the serializer, setting `content-type` if unset
    pub(crate) fn encode_body(&mut self, serializer: &dyn Serializer) -> Result<Option<bytes::Bytes>> {
        let Some(body) = &self.body else {
            return Ok(None);
        };
        let encoded = serializer.encode(body)?;
        if !self.headers.contains_key(CONTENT_TYPE) {
            let mime = HeaderValue::from_str(serializer.mime())
                .map_err(|e| Error::invalid_header("content-type", e))?;
            self.headers.insert(CONTENT_TYPE, mime);
        }
        Ok(Some(encoded))
    }
}

/// Validate a header name/value pair
pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::invalid_header(name, e))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e))?;
    Ok((header_name, header_value))
}

// ============================================================================
// Response
// ============================================================================

/// Transport detail kept alongside a response
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Final URL after redirects
    pub url: String,
    /// HTTP version negotiated, if a response arrived
    pub version: Option<reqwest::Version>,
    /// Time from send to body read
    pub elapsed: Duration,
}

impl TransportInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: None,
            elapsed: Duration::ZERO,
        }
    }
}

/// Uniform result of one HTTP exchange
///
/// Exactly one of `content` and `error` is meaningful: transport and
/// decode failures land in `error` with `content` left empty.
#[derive(Debug)]
pub struct Response {
    /// HTTP status, or 0 when no response was received
    pub http_code: u16,
    pub headers: HeaderMap,
    /// Decoded body; `None` for 204 and empty bodies
    pub content: Option<Value>,
    pub error: Option<Error>,
    pub extra: TransportInfo,
}

impl Response {
    pub fn new(
        http_code: u16,
        headers: HeaderMap,
        content: Option<Value>,
        error: Option<Error>,
        extra: TransportInfo,
    ) -> Self {
        Self {
            http_code,
            headers,
            content,
            error,
            extra,
        }
    }

    /// A response carrying decoded content
    pub fn with_content(http_code: u16, content: Value) -> Self {
        Self::new(
            http_code,
            HeaderMap::new(),
            Some(content),
            None,
            TransportInfo::new(""),
        )
    }

    /// A response for an exchange that never produced a decodable body
    pub fn failed(error: Error, extra: TransportInfo) -> Self {
        Self::new(0, HeaderMap::new(), None, Some(error), extra)
    }

    /// Build a response from a raw body, decoding it with the serializer
    pub(crate) fn decode(
        http_code: u16,
        headers: HeaderMap,
        body: &[u8],
        serializer: &dyn Serializer,
        extra: TransportInfo,
    ) -> Self {
        if http_code == 204 || body.is_empty() {
            return Self::new(http_code, headers, None, None, extra);
        }
        match serializer.decode(body) {
            Ok(content) => Self::new(http_code, headers, Some(content), None, extra),
            Err(e) => Self::new(http_code, headers, None, Some(e), extra),
        }
    }

    /// Look up a response header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_code)
    }
}

/// Translate a reqwest failure into the crate error, flagging timeouts
pub(crate) fn transport_error(error: reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        Error::Http(error)
    }
}
