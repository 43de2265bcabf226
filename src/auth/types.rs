//! Auth configuration types

use crate::error::Result;
use crate::transport::OutgoingRequest;
use crate::types::Method;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Status codes accepted from a login request
pub const OK_LOGIN_CODES: [u16; 2] = [200, 201];

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Fixed headers copied onto every request
    Headers {
        /// Header name/value pairs
        headers: BTreeMap<String, String>,
    },

    /// Perform a login request once and reuse its session cookie
    Login {
        /// Login endpoint URL
        url: String,
        /// HTTP method for login (POST by default)
        #[serde(default = "default_login_method")]
        method: Method,
        /// Login request body, sent as JSON
        #[serde(default)]
        body: Option<Value>,
        /// Extra headers for the login request
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },

    /// Caller-supplied strategy; code only, never read from config files
    #[serde(skip)]
    Custom(CustomAuth),
}

fn default_login_method() -> Method {
    Method::POST
}

impl AuthConfig {
    /// Basic auth from a user/password pair
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Inject a single header
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(name.into(), value.into());
        Self::Headers { headers }
    }

    /// Inject several headers
    pub fn headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Headers {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Run a closure against every outgoing request
    pub fn custom<F>(strategy: F) -> Self
    where
        F: Fn(&mut OutgoingRequest) -> Result<()> + Send + Sync + 'static,
    {
        Self::Custom(CustomAuth::new(strategy))
    }

    /// POST a JSON body to a login endpoint
    pub fn login(url: impl Into<String>, body: Value) -> Self {
        Self::Login {
            url: url.into(),
            method: Method::POST,
            body: Some(body),
            headers: BTreeMap::new(),
        }
    }
}

/// A request-mutating auth strategy
pub type AuthFn = Arc<dyn Fn(&mut OutgoingRequest) -> Result<()> + Send + Sync>;

/// Wrapper that lets a closure sit in [`AuthConfig`]
///
/// Two values are equal only when they share the same closure.
#[derive(Clone)]
pub struct CustomAuth(AuthFn);

impl CustomAuth {
    pub fn new<F>(strategy: F) -> Self
    where
        F: Fn(&mut OutgoingRequest) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(strategy))
    }

    pub fn apply(&self, request: &mut OutgoingRequest) -> Result<()> {
        (self.0)(request)
    }
}

impl PartialEq for CustomAuth {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CustomAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomAuth(..)")
    }
}

impl<U: Into<String>, P: Into<String>> From<(U, P)> for AuthConfig {
    fn from((username, password): (U, P)) -> Self {
        Self::basic(username, password)
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(matches!(config, AuthConfig::None));
    }

    #[test]
    fn test_pair_is_basic_auth() {
        let config = AuthConfig::from(("user", "pass"));
        assert_eq!(config, AuthConfig::basic("user", "pass"));
    }

    #[test]
    fn test_custom_auth_equality_and_serialization() {
        let custom = AuthConfig::custom(|req| req.set_header("x-signed", "yes"));
        assert_eq!(custom.clone(), custom);
        assert_ne!(custom, AuthConfig::custom(|_| Ok(())));
        assert_eq!(format!("{custom:?}"), "Custom(CustomAuth(..))");
        assert!(serde_yaml::to_string(&custom).is_err());
    }

    #[test]
    fn test_login_defaults_from_yaml() {
        let yaml = "type: login\nurl: https://example.com/login\n";
        let config: AuthConfig = serde_yaml::from_str(yaml).unwrap();

        match config {
            AuthConfig::Login {
                method, body, headers, ..
            } => {
                assert_eq!(method, Method::POST);
                assert!(body.is_none());
                assert!(headers.is_empty());
            }
            other => panic!("Expected Login, got {other:?}"),
        }
    }
}
