//! Blocking adapter on reqwest::blocking
//!
//! Every call parks the calling thread until the exchange completes. Do
//! not call it from inside an async runtime worker; use `spawn_blocking`.

use super::adapter::{Adapter, BlockingTransport, SessionState};
use super::rate_limit::RateLimiter;
use super::types::{transport_error, AdapterConfig, OutgoingRequest, Response, TransportInfo};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::serialize::Serializer;
use reqwest::blocking::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Adapter built on the blocking reqwest client
pub struct BlockingAdapter {
    client: Client,
    config: AdapterConfig,
    serializer: Arc<dyn Serializer>,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
    session: SessionState,
}

impl BlockingAdapter {
    pub fn new(config: AdapterConfig, serializer: Arc<dyn Serializer>) -> Result<Self> {
        Self::with_auth(config, serializer, AuthConfig::None)
    }

    pub fn with_auth(
        config: AdapterConfig,
        serializer: Arc<dyn Serializer>,
        auth: AuthConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
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

impl Adapter for BlockingAdapter {
    fn session(&self) -> &SessionState {
        &self.session
    }
}

impl BlockingTransport for BlockingAdapter {
    fn request(&self, mut request: OutgoingRequest) -> Result<Response> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait_blocking();
        }

        self.session.prepare(&mut request)?;
        let timeout = *request.timeout.get_or_insert(self.config.request_timeout);
        self.authenticator
            .apply_blocking(&self.client, &mut request)?;

        let body = request.encode_body(self.serializer.as_ref())?;

        let mut req = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers.clone())
            .timeout(timeout);
        if !request.query.is_empty() {
            req = req.query(&request.query.to_pairs());
        }
        if let Some(body) = body {
            req = req.body(body);
        }

        debug!("Sending request: {} {}", request.method, request.url);
        let started = Instant::now();
        let exchange = req.send().and_then(|response| {
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let url = response.url().to_string();
            let version = response.version();
            let body = response.bytes()?;
            Ok((status, headers, url, version, body))
        });

        let mut extra = TransportInfo::new(request.url.as_str());
        extra.elapsed = started.elapsed();
        match exchange {
            Ok((status, headers, url, version, body)) => {
                extra.url = url;
                extra.version = Some(version);
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
            Err(e) => {
                warn!("Request failed: {} {}: {}", request.method, request.url, e);
                Ok(Response::failed(transport_error(e, timeout), extra))
            }
        }
    }
}

impl std::fmt::Debug for BlockingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingAdapter")
            .field("config", &self.config)
            .field("serializer", &self.serializer)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
