//! Cooperative adapter on reqwest + tokio
//!
//! `AsyncAdapter::request` suspends only while the request is in flight;
//! the surrounding runtime keeps running other tasks.

use super::adapter::{Adapter, AsyncTransport, SessionState};
use super::rate_limit::RateLimiter;
use super::types::{transport_error, AdapterConfig, OutgoingRequest, Response, TransportInfo};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::serialize::Serializer;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Adapter built on the async reqwest client
pub struct AsyncAdapter {
    client: Client,
    config: AdapterConfig,
    serializer: Arc<dyn Serializer>,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
    session: SessionState,
}

impl AsyncAdapter {
    /// Create an adapter with the given config and serializer
    pub fn new(config: AdapterConfig, serializer: Arc<dyn Serializer>) -> Result<Self> {
        Self::with_auth(config, serializer, AuthConfig::None)
    }

    /// Create an adapter that authenticates every request
    pub fn with_auth(
        config: AdapterConfig,
        serializer: Arc<dyn Serializer>,
        auth: AuthConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()?;

        let session = SessionState::new();
        for (key, value) in &config.default_headers {
            session.set_header(key, value)?;
        }
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            serializer,
            authenticator: Authenticator::new(auth),
            rate_limiter,
            session,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

impl Adapter for AsyncAdapter {
    fn session(&self) -> &SessionState {
        &self.session
    }
}

#[async_trait]
impl AsyncTransport for AsyncAdapter {
    async fn request(&self, mut request: OutgoingRequest) -> Result<Response> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        self.session.prepare(&mut request)?;
        let timeout = *request.timeout.get_or_insert(self.config.request_timeout);
        self.authenticator.apply(&self.client, &mut request).await?;

        let body = request.encode_body(self.serializer.as_ref())?;

        let mut req = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            req = req.query(&request.query.to_pairs());
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        debug!("Sending request: {} {}", request.method, request.url);
        let started = Instant::now();
        let exchange = async {
            let response = req.send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let url = response.url().to_string();
            let version = response.version();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, url, version, body))
        };

        let mut extra = TransportInfo::new(request.url.as_str());
        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok((status, headers, url, version, body))) => {
                extra.url = url;
                extra.version = Some(version);
                extra.elapsed = started.elapsed();
                debug!(
                    "Request finished: {} {} -> {} in {:?}",
                    request.method, extra.url, status, extra.elapsed
                );
                Ok(Response::decode(
                    status,
                    headers,
                    &body,
                    self.serializer.as_ref(),
                    extra,
                ))
            }
            Ok(Err(e)) => {
                extra.elapsed = started.elapsed();
                warn!("Request failed: {} {}: {}", request.method, request.url, e);
                Ok(Response::failed(transport_error(e, timeout), extra))
            }
            Err(_) => {
                extra.elapsed = started.elapsed();
                warn!(
                    "Request timeout after {:?}: {} {}",
                    timeout, request.method, request.url
                );
                Ok(Response::failed(
                    Error::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    },
                    extra,
                ))
            }
        }
    }
}

impl std::fmt::Debug for AsyncAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncAdapter")
            .field("config", &self.config)
            .field("serializer", &self.serializer)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
