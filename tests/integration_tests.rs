//! Integration tests using mock HTTP server
//!
//! Tests the full flow: builder → adapter → HTTP → envelope → records and pages

use serde_json::json;
use std::io::Write;
use syndicate::{
    load_config, AuthConfig, Error, PagerOptions, Record, RequestConfig, Service, Value,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn envelope(data: serde_json::Value, meta: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": data,
        "meta": meta,
    }))
}

// ============================================================================
// Service Integration Tests
// ============================================================================

#[tokio::test]
async fn test_get_unwraps_envelope_and_coerces_datetimes() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/42/"))
        .and(header("accept", "application/json"))
        .respond_with(envelope(
            json!({"id": 42, "name": "Alice", "created": "2024-03-01T12:30:00Z"}),
            json!({}),
        ))
        .mount(&server)
        .await;

    let service = Service::builder()
        .uri(server.uri())
        .urn("/api")
        .build()
        .unwrap();

    let record = service.get(&["users", "42"]).await.unwrap();
    let user = record.as_object().expect("object record");
    assert_eq!(user.get("name"), Some(&Value::from("Alice")));
    assert!(user.get("created").and_then(Value::as_datetime).is_some());
    assert!(user.meta().is_empty());

    assert!(service.close());
    assert!(matches!(service.get(&["users"]).await, Err(Error::Closed)));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Bob"})))
        .respond_with(envelope(json!({"id": 7}), json!(null)))
        .mount(&server)
        .await;

    let service = Service::builder()
        .uri(server.uri())
        .urn("api")
        .build()
        .unwrap();

    let body: Value = json!({"name": "Bob"}).into();
    let record = service.post(&["users"], body).await.unwrap();
    assert_eq!(record.into_value(), Value::from(json!({"id": 7})));
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/broken/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "bad request",
        })))
        .mount(&server)
        .await;

    let service = Service::builder()
        .uri(server.uri())
        .urn("/api")
        .build()
        .unwrap();

    let err = service.get(&["broken"]).await.unwrap_err();
    assert!(matches!(err, Error::Response { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_header_auth_and_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("X-API-Key", "secret"))
        .and(query_param("q", "rust"))
        .respond_with(envelope(json!([1, 2, 3]), json!({"total_count": 3})))
        .mount(&server)
        .await;

    let service = Service::builder()
        .uri(server.uri())
        .trailing_slash(false)
        .auth(AuthConfig::header("X-API-Key", "secret"))
        .build()
        .unwrap();

    let record = service
        .get_with_config(&["search"], RequestConfig::new().param("q", "rust"))
        .await
        .unwrap();
    let Record::Sequence(items) = record else {
        panic!("expected a sequence");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items.meta().total_count(), Some(3));
}

#[tokio::test]
async fn test_login_auth_reuses_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"user": "me", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).append_header("set-cookie", "sid=abc; Path=/"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .and(header("cookie", "sid=abc"))
        .respond_with(envelope(json!({"user": "me"}), json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let auth = AuthConfig::Login {
        url: format!("{}/login", server.uri()),
        method: syndicate::Method::POST,
        body: Some(json!({"user": "me", "password": "pw"}).into()),
        headers: Default::default(),
    };
    let service = Service::builder()
        .uri(server.uri())
        .urn("/api")
        .auth(auth)
        .build()
        .unwrap();

    for _ in 0..2 {
        let record = service.get(&["me"]).await.unwrap();
        assert_eq!(record.kind(), "object");
    }
}

#[tokio::test]
async fn test_failed_login_is_not_repeated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .respond_with(envelope(json!({"user": "me"}), json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let service = Service::builder()
        .uri(server.uri())
        .urn("/api")
        .auth(AuthConfig::login(format!("{}/login", server.uri()), Value::Null))
        .build()
        .unwrap();

    for _ in 0..3 {
        let err = service.get(&["me"]).await.unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
    }
}

#[tokio::test]
async fn test_custom_auth_signs_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me/"))
        .and(header("x-signature", "GET"))
        .respond_with(envelope(json!({"user": "me"}), json!({})))
        .mount(&server)
        .await;

    let service = Service::builder()
        .uri(server.uri())
        .urn("/api")
        .auth(AuthConfig::custom(|req| {
            let method = req.method.to_string();
            req.set_header("x-signature", &method)
        }))
        .build()
        .unwrap();

    let record = service.get(&["me"]).await.unwrap();
    assert_eq!(record.kind(), "object");
}

// ============================================================================
// Pagination Integration Tests
// ============================================================================

async fn mount_two_pages(server: &MockServer) {
    let next = format!("{}/api/items/?cursor=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .and(query_param("cursor", "2"))
        .respond_with(envelope(json!([{"id": 3}]), json!({"next": null})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .and(query_param("page_size", "2"))
        .respond_with(envelope(
            json!([{"id": 1}, {"id": 2}]),
            json!({"next": next, "total_count": 3}),
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pager_follows_next_link() {
    init_tracing();
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let service = Service::builder()
        .uri(server.uri())
        .urn("/api")
        .build()
        .unwrap();
    let pager = service
        .get_pager(&["items"], PagerOptions::new().page_size(2))
        .unwrap();

    let mut ids = Vec::new();
    while let Some(item) = pager.next().await.unwrap() {
        ids.push(item.get("id").and_then(Value::as_i64).unwrap());
    }
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(pager.is_exhausted());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blocking_service_pages() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;
    let uri = server.uri();

    let (ids, total) = tokio::task::spawn_blocking(move || {
        let service = Service::builder()
            .uri(uri)
            .urn("/api")
            .build_blocking()
            .unwrap();
        let mut pager = service
            .get_pager(&["items"], PagerOptions::new().page_size(2))
            .unwrap();
        let total = pager.total_count().unwrap();
        let ids: Vec<i64> = pager
            .map(|item| item.unwrap().get("id").and_then(Value::as_i64).unwrap())
            .collect();
        service.close();
        (ids, total)
    })
    .await
    .unwrap();

    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(total, Some(3));
}

// ============================================================================
// Config Integration Tests
// ============================================================================

#[tokio::test]
async fn test_service_from_config_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/status"))
        .and(header("X-Tenant", "acme"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(envelope(json!("ok"), json!({})))
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "uri: {}\nurn: /v1\ntrailing_slash: false\nauth:\n  type: basic\n  username: user\n  password: pass\nhttp:\n  headers:\n    X-Tenant: acme\n",
        server.uri()
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let service = config.builder().build().unwrap();

    let record = service.get(&["status"]).await.unwrap();
    assert_eq!(record.as_scalar(), Some(&Value::from("ok")));
}
