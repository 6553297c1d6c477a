//! Shared fixtures for the end-to-end API tests.
//!
//! Each test builds its own router over fresh in-memory repositories and an
//! admission controller scoped to the test, then drives it in-process with
//! `tower::ServiceExt::oneshot`.

#![cfg(feature = "web-axum")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Utc;
use secrecy::SecretString;
use uuid::Uuid;

use api_adapters::{AppState, Metrics};
use auth_adapters::{
    hash_password, AdmissionConfig, AdmissionController, Authenticator, TokenCodec,
};
use domains::AdminUser;
use services::ModerationService;
use storage_adapters::memory::{MemoryCommentRepo, MemoryIdentityRepo, MemoryPostRepo};

pub const TEST_ADMIN: &str = "admin";
pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const TEST_CLIENT: &str = "192.0.2.4";

/// An admission config wide enough to stay out of the way.
pub fn lenient_admission() -> AdmissionConfig {
    AdmissionConfig {
        ceiling: 1_000,
        window: Duration::from_secs(60),
        trusted_keys: Default::default(),
    }
}

pub fn test_router(admission: AdmissionConfig) -> Router {
    let identities = Arc::new(MemoryIdentityRepo::new());
    identities.seed(AdminUser {
        id: Uuid::new_v4(),
        username: TEST_ADMIN.to_string(),
        password_hash: hash_password(&SecretString::from(TEST_PASSWORD.to_string())).unwrap(),
        is_active: true,
        created_at: Utc::now(),
        last_login: None,
    });

    let codec = TokenCodec::new(&SecretString::from("integration-test-secret".to_string()));
    let state = AppState {
        authenticator: Arc::new(
            Authenticator::new(identities, codec, chrono::Duration::minutes(30)).unwrap(),
        ),
        moderation: Arc::new(ModerationService::new(
            Arc::new(MemoryPostRepo::new()),
            Arc::new(MemoryCommentRepo::new()),
        )),
        admission: Arc::new(AdmissionController::new(admission)),
        metrics: Arc::new(Metrics::new()),
        trust_proxy_headers: false,
    };
    api_adapters::router(state)
}

fn peer() -> SocketAddr {
    format!("{TEST_CLIENT}:50400").parse().unwrap()
}

/// A form-encoded login request from the given client address.
pub fn login_request_from(client: &str, username: &str, password: &str) -> Request<Body> {
    let peer: SocketAddr = format!("{client}:50400").parse().unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(ConnectInfo(peer))
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    login_request_from(TEST_CLIENT, username, password)
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    authorized(Request::builder().method("GET").uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str, token: &str) -> Request<Body> {
    authorized(Request::builder().method("DELETE").uri(uri), Some(token))
        .body(Body::empty())
        .unwrap()
}

pub fn put_request(uri: &str, token: &str) -> Request<Body> {
    authorized(Request::builder().method("PUT").uri(uri), Some(token))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    authorized(Request::builder().method(method).uri(uri), Some(token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authorized(
    builder: axum::http::request::Builder,
    token: Option<&str>,
) -> axum::http::request::Builder {
    let builder = builder.extension(ConnectInfo(peer()));
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// Collects the response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Collects the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Logs the fixture admin in and returns the bearer token.
pub async fn login_token(router: &Router) -> String {
    use tower::ServiceExt;

    let response = router
        .clone()
        .oneshot(login_request(TEST_ADMIN, TEST_PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}
