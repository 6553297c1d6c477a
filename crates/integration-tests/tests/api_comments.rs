//! Comment creation rules and reply-tree reconstruction over HTTP.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use integration_tests::{
    body_bytes, body_json, get_request, json_request, lenient_admission, login_token, test_router,
};

async fn create_post(app: &axum::Router, token: &str) -> String {
    let body = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/admin/forum/posts",
                token,
                json!({
                    "title": "Thread base",
                    "body": "Body",
                    "category": "POLICY",
                    "author_id": Uuid::new_v4(),
                }),
            ))
            .await
            .unwrap(),
    )
    .await;
    body["id"].as_str().unwrap().to_string()
}

async fn create_comment(
    app: &axum::Router,
    token: &str,
    post_id: &str,
    parent_id: Option<&str>,
) -> serde_json::Value {
    let mut draft = json!({
        "body": "a reply",
        "post_id": post_id,
        "author_id": Uuid::new_v4(),
    });
    if let Some(parent_id) = parent_id {
        draft["parent_id"] = json!(parent_id);
    }
    body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/admin/forum/comments",
                token,
                draft,
            ))
            .await
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn comments_start_pending() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;
    let post_id = create_post(&app, &token).await;

    let comment = create_comment(&app, &token, &post_id, None).await;
    assert_eq!(comment["status"], "pending");
    assert!(comment["publish_date"].is_null());
}

#[tokio::test]
async fn comment_on_missing_post_is_404() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/forum/comments",
            &token,
            json!({
                "body": "orphan",
                "post_id": Uuid::new_v4(),
                "author_id": Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Post not found");
}

#[tokio::test]
async fn reply_to_missing_parent_is_404() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;
    let post_id = create_post(&app, &token).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/forum/comments",
            &token,
            json!({
                "body": "reply",
                "post_id": post_id,
                "parent_id": Uuid::new_v4(),
                "author_id": Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "Parent comment not found"
    );
}

#[tokio::test]
async fn cross_post_parent_is_rejected_and_not_persisted() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;
    let post_a = create_post(&app, &token).await;
    let post_b = create_post(&app, &token).await;
    let parent_on_a = create_comment(&app, &token, &post_a, None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/forum/comments",
            &token,
            json!({
                "body": "wrong thread",
                "post_id": post_b,
                "parent_id": parent_on_a["id"],
                "author_id": Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let tree = body_json(
        app.oneshot(get_request(
            &format!("/api/v1/admin/forum/comments/tree?post_id={post_b}"),
            Some(&token),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(tree, json!([]));
}

#[tokio::test]
async fn tree_nests_a_three_level_chain() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;
    let post_id = create_post(&app, &token).await;

    let a = create_comment(&app, &token, &post_id, None).await;
    let b = create_comment(&app, &token, &post_id, a["id"].as_str()).await;
    let c = create_comment(&app, &token, &post_id, b["id"].as_str()).await;

    let tree = body_json(
        app.clone()
            .oneshot(get_request(
                &format!("/api/v1/admin/forum/comments/tree?post_id={post_id}"),
                Some(&token),
            ))
            .await
            .unwrap(),
    )
    .await;

    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], a["id"]);
    assert_eq!(roots[0]["replies"][0]["id"], b["id"]);
    assert_eq!(roots[0]["replies"][0]["replies"][0]["id"], c["id"]);
    assert_eq!(
        roots[0]["replies"][0]["replies"][0]["replies"],
        json!([])
    );
}

#[tokio::test]
async fn tree_is_deterministic_across_calls() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;
    let post_id = create_post(&app, &token).await;

    let root = create_comment(&app, &token, &post_id, None).await;
    create_comment(&app, &token, &post_id, root["id"].as_str()).await;
    create_comment(&app, &token, &post_id, root["id"].as_str()).await;

    let uri = format!("/api/v1/admin/forum/comments/tree?post_id={post_id}");
    let first = body_bytes(
        app.clone()
            .oneshot(get_request(&uri, Some(&token)))
            .await
            .unwrap(),
    )
    .await;
    let second = body_bytes(app.oneshot(get_request(&uri, Some(&token))).await.unwrap()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn tree_for_missing_post_is_404() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let response = app
        .oneshot(get_request(
            &format!("/api/v1/admin/forum/comments/tree?post_id={}", Uuid::new_v4()),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
