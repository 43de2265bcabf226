//! Authenticator implementation
//!
//! Applies authentication to outgoing requests and caches the login
//! session cookie.

use super::types::{AuthConfig, OK_LOGIN_CODES};
use crate::error::{Error, Result};
use crate::transport::{parse_header, transport_error, OutgoingRequest};
use crate::types::Method;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Cookie from a successful login, or the message of a failed one
type LoginOutcome = std::result::Result<String, String>;

/// Authenticator handles applying authentication to outgoing requests
#[derive(Debug, Default)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Outcome of the one login attempt; never refreshed
    login_outcome: OnceCell<LoginOutcome>,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            login_outcome: OnceCell::new(),
        }
    }

    /// Apply authentication to a request, logging in first if needed
    ///
    /// The login request is bounded by `request.timeout` when it is set.
    pub async fn apply(&self, client: &reqwest::Client, request: &mut OutgoingRequest) -> Result<()> {
        if let AuthConfig::Login { .. } = self.config {
            let timeout = request.timeout;
            let mut fresh_error = None;
            let slot = &mut fresh_error;
            let outcome = self
                .login_outcome
                .get_or_init(|| async move {
                    self.login(client, timeout).await.map_err(|e| {
                        let message = failure_message(&e);
                        *slot = Some(e);
                        message
                    })
                })
                .await;
            if let Some(error) = fresh_error {
                return Err(error);
            }
            return attach_cookie(outcome, request);
        }
        self.apply_static(request)
    }

    /// Apply authentication using a blocking client for the login request
    pub fn apply_blocking(
        &self,
        client: &reqwest::blocking::Client,
        request: &mut OutgoingRequest,
    ) -> Result<()> {
        if let AuthConfig::Login { .. } = self.config {
            let outcome = match self.login_outcome.get() {
                Some(outcome) => outcome,
                None => {
                    let fresh = self.login_blocking(client, request.timeout);
                    let _ = self
                        .login_outcome
                        .set(fresh.as_ref().cloned().map_err(failure_message));
                    fresh?;
                    self.login_outcome
                        .get()
                        .ok_or_else(|| Error::authentication("Login outcome was not recorded"))?
                }
            };
            return attach_cookie(outcome, request);
        }
        self.apply_static(request)
    }

    /// Apply the auth types that need no network access
    fn apply_static(&self, request: &mut OutgoingRequest) -> Result<()> {
        match &self.config {
            AuthConfig::None | AuthConfig::Login { .. } => Ok(()),
            AuthConfig::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                request.set_header("authorization", &format!("Basic {encoded}"))
            }
            AuthConfig::Headers { headers } => {
                for (name, value) in headers {
                    request.set_header(name, value)?;
                }
                Ok(())
            }
            AuthConfig::Custom(custom) => custom.apply(request),
        }
    }

    async fn login(&self, client: &reqwest::Client, timeout: Option<Duration>) -> Result<String> {
        let (url, method, body, headers) = self.login_parts()?;
        debug!("Logging in: {} {}", method, url);

        let mut req = client
            .request(method.into(), url)
            .headers(login_headers(headers)?);
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(limit) = timeout {
            req = req.timeout(limit);
        }
        let response = req.send().await.map_err(|e| send_error(e, timeout))?;
        session_cookie_from(response.status().as_u16(), response.headers())
    }

    fn login_blocking(
        &self,
        client: &reqwest::blocking::Client,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let (url, method, body, headers) = self.login_parts()?;
        debug!("Logging in: {} {}", method, url);

        let mut req = client
            .request(method.into(), url)
            .headers(login_headers(headers)?);
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(limit) = timeout {
            req = req.timeout(limit);
        }
        let response = req.send().map_err(|e| send_error(e, timeout))?;
        session_cookie_from(response.status().as_u16(), response.headers())
    }

    fn login_parts(&self) -> Result<(&str, Method, Option<&Value>, &BTreeMap<String, String>)> {
        match &self.config {
            AuthConfig::Login {
                url,
                method,
                body,
                headers,
            } => Ok((url.as_str(), *method, body.as_ref(), headers)),
            _ => Err(Error::authentication("Login not supported for this auth type")),
        }
    }

    /// The cached login cookie, if a login has succeeded
    pub fn session_cookie(&self) -> Option<&str> {
        self.login_outcome
            .get()
            .and_then(|outcome| outcome.as_ref().ok())
            .map(String::as_str)
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Replay a cached login outcome onto a request
fn attach_cookie(outcome: &LoginOutcome, request: &mut OutgoingRequest) -> Result<()> {
    match outcome {
        Ok(cookie) => request.add_cookies(cookie),
        Err(message) => Err(Error::authentication(message.clone())),
    }
}

fn failure_message(error: &Error) -> String {
    match error {
        Error::Authentication { message } => message.clone(),
        other => format!("Login failed: {other}"),
    }
}

fn send_error(error: reqwest::Error, timeout: Option<Duration>) -> Error {
    match timeout {
        Some(limit) => transport_error(error, limit),
        None => Error::Http(error),
    }
}

/// Login requests default to a JSON content type; configured headers win
fn login_headers(extra: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        let (name, value) = parse_header(name, value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Check the login status and collect `name=value` from each `Set-Cookie`
fn session_cookie_from(status: u16, headers: &HeaderMap) -> Result<String> {
    if !OK_LOGIN_CODES.contains(&status) {
        warn!("Login rejected with status {}", status);
        return Err(Error::authentication(format!(
            "Login request failed with status {status}"
        )));
    }

    let cookies: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if cookies.is_empty() {
        return Err(Error::authentication("Login response did not set a cookie"));
    }
    Ok(cookies.join("; "))
}
