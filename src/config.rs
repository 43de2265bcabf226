//! Service configuration files
//!
//! A [`ServiceConfig`] describes one service in YAML and turns into a
//! [`ServiceBuilder`], so getters or a custom serializer can still be
//! added in code before building.
//!
//! ```yaml
//! uri: https://api.example.com
//! urn: /api/v1
//! auth:
//!   type: headers
//!   headers:
//!     X-API-Key: secret
//! http:
//!   timeout_seconds: 10
//!   rate_limit:
//!     requests_per_second: 5
//!     burst_size: 5
//! ```

use crate::auth::AuthConfig;
use crate::error::{Error, Result, ResultExt};
use crate::serialize::DEFAULT_SERIALIZER;
use crate::service::ServiceBuilder;
use crate::transport::{AdapterConfig, RateLimiterConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Service Config
// ============================================================================

/// Complete service configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base address
    pub uri: String,

    /// Default urn appended to the uri
    #[serde(default)]
    pub urn: String,

    /// Add a trailing slash to every request path
    #[serde(default = "default_trailing_slash")]
    pub trailing_slash: bool,

    /// Name of a registered serializer
    #[serde(default = "default_serializer")]
    pub serializer: String,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// HTTP adapter configuration
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_trailing_slash() -> bool {
    true
}

fn default_serializer() -> String {
    DEFAULT_SERIALIZER.to_string()
}

impl ServiceConfig {
    /// Parse and validate a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(Error::config("Service uri cannot be empty"));
        }
        ::url::Url::parse(&self.uri)?;

        if let AuthConfig::Login { url, .. } = &self.auth {
            ::url::Url::parse(url)?;
        }
        if let Some(limit) = &self.http.rate_limit {
            if limit.requests_per_second == 0 {
                return Err(Error::config("rate_limit.requests_per_second must be positive"));
            }
        }
        Ok(())
    }

    /// A service builder preloaded with this config
    pub fn builder(&self) -> ServiceBuilder {
        ServiceBuilder::new()
            .uri(&self.uri)
            .urn(&self.urn)
            .trailing_slash(self.trailing_slash)
            .serializer_name(&self.serializer)
            .auth(self.auth.clone())
            .adapter_config(self.http.adapter_config())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Idle connections kept per host
    #[serde(default = "default_pool_size")]
    pub pool_max_idle_per_host: usize,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Client side rate limiting
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            pool_max_idle_per_host: default_pool_size(),
            user_agent: None,
            headers: HashMap::new(),
            rate_limit: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_pool_size() -> usize {
    32
}

impl HttpConfig {
    /// Convert to the runtime adapter config
    pub fn adapter_config(&self) -> AdapterConfig {
        let mut builder = AdapterConfig::builder()
            .request_timeout(Duration::from_secs(self.timeout_seconds))
            .connect_timeout(Duration::from_secs(self.connect_timeout_seconds))
            .pool_max_idle_per_host(self.pool_max_idle_per_host);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if let Some(limit) = &self.rate_limit {
            builder = builder.rate_limit(limit.clone());
        }
        builder.build()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a service config from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<ServiceConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    ServiceConfig::from_yaml_str(&content)
}
