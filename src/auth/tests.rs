//! Tests for the auth module

use super::*;
use crate::error::Error;
use crate::transport::OutgoingRequest;
use crate::types::Method;
use crate::value::Value;
use base64::Engine;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> OutgoingRequest {
    OutgoingRequest::new(Method::GET, "https://example.com/api")
}

fn header_value<'a>(req: &'a OutgoingRequest, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let mut req = request();

    auth.apply(&client, &mut req).await.unwrap();
    assert!(req.headers.is_empty());
}

#[tokio::test]
async fn test_basic_auth() {
    let auth = Authenticator::new(AuthConfig::basic("user", "pass"));
    let client = reqwest::Client::new();
    let mut req = request();
    auth.apply(&client, &mut req).await.unwrap();

    let auth_header = header_value(&req, "Authorization").unwrap();
    assert!(auth_header.starts_with("Basic "));

    let encoded = auth_header.strip_prefix("Basic ").unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "user:pass");
}

#[tokio::test]
async fn test_header_auth_overwrites_and_preserves() {
    let client = reqwest::Client::new();
    let mut req = request();
    req.set_header("keep", "me").unwrap();

    Authenticator::new(AuthConfig::header("foo", "bar"))
        .apply(&client, &mut req)
        .await
        .unwrap();
    assert_eq!(header_value(&req, "foo"), Some("bar"));

    Authenticator::new(AuthConfig::header("foo", "replace"))
        .apply(&client, &mut req)
        .await
        .unwrap();
    assert_eq!(header_value(&req, "foo"), Some("replace"));
    assert_eq!(header_value(&req, "keep"), Some("me"));
    assert_eq!(req.headers.get_all("foo").iter().count(), 1);
}

#[test]
fn test_header_auth_mapping_blocking() {
    let auth = Authenticator::new(AuthConfig::headers([
        ("X-API-Key", "secret"),
        ("X-Tenant", "acme"),
    ]));
    let client = reqwest::blocking::Client::new();
    let mut req = request();
    auth.apply_blocking(&client, &mut req).unwrap();

    assert_eq!(header_value(&req, "x-api-key"), Some("secret"));
    assert_eq!(header_value(&req, "x-tenant"), Some("acme"));
}

#[test]
fn test_header_auth_invalid_name() {
    let auth = Authenticator::new(AuthConfig::header("bad header", "x"));
    let client = reqwest::blocking::Client::new();
    let err = auth.apply_blocking(&client, &mut request()).unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[test]
fn test_custom_auth_mutates_request() {
    let auth = Authenticator::new(AuthConfig::custom(|req| {
        let signature = format!("{}:{}", req.method, req.url.len());
        req.set_header("x-signature", &signature)
    }));
    let client = reqwest::blocking::Client::new();
    let mut req = request();
    req.set_header("keep", "me").unwrap();
    auth.apply_blocking(&client, &mut req).unwrap();

    assert_eq!(header_value(&req, "x-signature"), Some("GET:23"));
    assert_eq!(header_value(&req, "keep"), Some("me"));
}

#[tokio::test]
async fn test_custom_auth_error_propagates() {
    let auth = Authenticator::new(AuthConfig::custom(|_| {
        Err(Error::authentication("token expired"))
    }));
    let client = reqwest::Client::new();
    let err = auth.apply(&client, &mut request()).await.unwrap_err();
    assert!(err.to_string().contains("token expired"));
}

// ============================================================================
// Login Flow Tests
// ============================================================================

#[tokio::test]
async fn test_login_caches_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"user": "u", "pass": "p"})))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "session=abc123; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::login(
        format!("{}/login", mock_server.uri()),
        Value::from(json!({"user": "u", "pass": "p"})),
    ));
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let mut req = request();
        auth.apply(&client, &mut req).await.unwrap();
        assert_eq!(header_value(&req, "cookie"), Some("session=abc123"));
    }
    assert_eq!(auth.session_cookie(), Some("session=abc123"));
}

#[tokio::test]
async fn test_login_merges_multiple_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(201)
                .append_header("set-cookie", "a=1; Path=/")
                .append_header("set-cookie", "b=2"),
        )
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::login(
        format!("{}/login", mock_server.uri()),
        Value::Null,
    ));
    let client = reqwest::Client::new();
    let mut req = request();
    req.add_cookies("pref=dark").unwrap();
    auth.apply(&client, &mut req).await.unwrap();

    assert_eq!(header_value(&req, "cookie"), Some("pref=dark; a=1; b=2"));
}

#[tokio::test]
async fn test_login_rejected_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::login(
        format!("{}/login", mock_server.uri()),
        Value::Null,
    ));
    let client = reqwest::Client::new();

    // the failed login is replayed, never re-sent
    for _ in 0..3 {
        let err = auth.apply(&client, &mut request()).await.unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
        assert!(err.to_string().contains("401"));
    }
    assert!(auth.session_cookie().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_blocking_failure_is_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::login(
        format!("{}/login", mock_server.uri()),
        Value::Null,
    ));

    let messages = tokio::task::spawn_blocking(move || {
        let client = reqwest::blocking::Client::new();
        (0..3)
            .map(|_| auth.apply_blocking(&client, &mut request()).unwrap_err().to_string())
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|m| m.contains("403")));
}

#[tokio::test]
async fn test_login_bounded_by_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "sid=late")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::login(
        format!("{}/login", mock_server.uri()),
        Value::Null,
    ));
    let client = reqwest::Client::new();
    let mut req = request().with_timeout(Duration::from_millis(100));

    let started = Instant::now();
    let err = auth.apply(&client, &mut req).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(err, Error::Timeout { timeout_ms: 100 }), "got {err:?}");

    // later calls replay the failure without waiting on the endpoint again
    let err = auth.apply(&client, &mut request()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.to_string().contains("timeout"));
}

#[tokio::test]
async fn test_login_without_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::login(
        format!("{}/login", mock_server.uri()),
        Value::Null,
    ));
    let client = reqwest::Client::new();
    let err = auth.apply(&client, &mut request()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_blocking_caches_cookie() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/session"))
        .and(header("x-client", "tests"))
        .respond_with(ResponseTemplate::new(200).append_header("set-cookie", "sid=42"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = std::collections::BTreeMap::new();
    headers.insert("x-client".to_string(), "tests".to_string());
    let auth = Authenticator::new(AuthConfig::Login {
        url: format!("{}/session", mock_server.uri()),
        method: Method::PUT,
        body: None,
        headers,
    });

    let cookies = tokio::task::spawn_blocking(move || {
        let client = reqwest::blocking::Client::new();
        (0..2)
            .map(|_| {
                let mut req = request();
                auth.apply_blocking(&client, &mut req).unwrap();
                header_value(&req, "cookie").map(str::to_string)
            })
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    assert_eq!(
        cookies,
        vec![Some("sid=42".to_string()), Some("sid=42".to_string())]
    );
}
