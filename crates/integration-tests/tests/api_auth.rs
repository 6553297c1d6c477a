//! Login and bearer-authorization behavior over the HTTP surface.

use axum::http::{header, StatusCode};
use tower::ServiceExt;

use integration_tests::{
    body_bytes, body_json, get_request, lenient_admission, login_request, login_token,
    test_router, TEST_ADMIN, TEST_PASSWORD,
};

#[tokio::test]
async fn successful_login_returns_a_bearer_token() {
    let app = test_router(lenient_admission());
    let response = app
        .clone()
        .oneshot(login_request(TEST_ADMIN, TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn failed_logins_are_byte_identical() {
    let app = test_router(lenient_admission());

    let wrong_password = app
        .clone()
        .oneshot(login_request(TEST_ADMIN, "wrong-password"))
        .await
        .unwrap();
    let unknown_user = app
        .clone()
        .oneshot(login_request("ghost", "wrong-password"))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.headers().get(header::WWW_AUTHENTICATE),
        unknown_user.headers().get(header::WWW_AUTHENTICATE),
    );
    assert_eq!(
        body_bytes(wrong_password).await,
        body_bytes(unknown_user).await
    );
}

#[tokio::test]
async fn rejection_carries_the_standard_message_and_challenge() {
    let app = test_router(lenient_admission());
    let response = app
        .oneshot(login_request(TEST_ADMIN, "wrong-password"))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn protected_route_rejects_missing_and_garbage_tokens() {
    let app = test_router(lenient_admission());

    let missing = app
        .clone()
        .oneshot(get_request("/api/v1/admin/me", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        missing
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );

    let garbage = app
        .clone()
        .oneshot(get_request("/api/v1/admin/me", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    // flip one character in the signature segment
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = app
        .oneshot(get_request("/api/v1/admin/me", Some(&tampered)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_echoes_the_principal() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let response = app
        .oneshot(get_request("/api/v1/admin/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], TEST_ADMIN);
    assert!(body["admin_id"].as_str().is_some());
}

#[tokio::test]
async fn healthz_needs_no_credentials() {
    let app = test_router(lenient_admission());
    let response = app.oneshot(get_request("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
