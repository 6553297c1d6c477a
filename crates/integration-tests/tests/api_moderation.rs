//! Post lifecycle over the HTTP surface.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use integration_tests::{
    body_json, delete_request, get_request, json_request, lenient_admission, login_token,
    put_request, test_router,
};

fn post_draft() -> serde_json::Value {
    json!({
        "title": "Mediation outcomes, Q3",
        "body": "Write-up of recent outcomes.",
        "summary": "Q3 outcomes",
        "category": "EXPERIENCE",
        "author_id": Uuid::new_v4(),
    })
}

#[tokio::test]
async fn created_posts_start_pending_even_if_the_caller_says_otherwise() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let mut draft = post_draft();
    // unknown to the schema; must be ignored, not honored
    draft["status"] = json!("approved");

    let response = app
        .oneshot(json_request("POST", "/api/v1/admin/forum/posts", &token, draft))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert!(body["publish_date"].is_null());
}

#[tokio::test]
async fn publish_date_survives_remove_and_reapprove() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/admin/forum/posts",
                &token,
                post_draft(),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let approved = body_json(
        app.clone()
            .oneshot(put_request(
                &format!("/api/v1/admin/forum/posts/approve?post_id={id}"),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(approved["status"], "approved");
    let first_publish = approved["publish_date"].as_str().unwrap().to_string();

    let removed = body_json(
        app.clone()
            .oneshot(put_request(
                &format!("/api/v1/admin/forum/posts/remove?post_id={id}"),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(removed["status"], "removed");
    assert_eq!(removed["publish_date"], first_publish.as_str());

    let reapproved = body_json(
        app.clone()
            .oneshot(put_request(
                &format!("/api/v1/admin/forum/posts/approve?post_id={id}"),
                &token,
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(reapproved["status"], "approved");
    assert_eq!(reapproved["publish_date"], first_publish.as_str());
}

#[tokio::test]
async fn moderating_a_missing_post_is_404() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let response = app
        .oneshot(put_request(
            &format!("/api/v1/admin/forum/posts/approve?post_id={}", Uuid::new_v4()),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Post not found");
}

#[tokio::test]
async fn listing_filters_by_status_and_paginates() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let mut first_id = String::new();
    for _ in 0..3 {
        let created = body_json(
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/admin/forum/posts",
                    &token,
                    post_draft(),
                ))
                .await
                .unwrap(),
        )
        .await;
        first_id = created["id"].as_str().unwrap().to_string();
    }
    app.clone()
        .oneshot(put_request(
            &format!("/api/v1/admin/forum/posts/approve?post_id={first_id}"),
            &token,
        ))
        .await
        .unwrap();

    let pending = body_json(
        app.clone()
            .oneshot(get_request(
                "/api/v1/admin/forum/posts?status=pending&page=1&size=1",
                Some(&token),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(pending["total"], 2);
    assert_eq!(pending["items"].as_array().unwrap().len(), 1);
    assert_eq!(pending["page"], 1);
    assert_eq!(pending["size"], 1);

    let approved = body_json(
        app.clone()
            .oneshot(get_request(
                "/api/v1/admin/forum/posts?status=approved",
                Some(&token),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(approved["total"], 1);
}

#[tokio::test]
async fn status_outside_the_enumerated_set_is_a_bad_request() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let response = app
        .oneshot(get_request(
            "/api/v1/admin/forum/posts?status=published",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_post_cascades_to_comments() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let post = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/admin/forum/posts",
                &token,
                post_draft(),
            ))
            .await
            .unwrap(),
    )
    .await;
    let post_id = post["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/admin/forum/comments",
            &token,
            json!({
                "body": "first",
                "post_id": post_id,
                "author_id": Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();

    let deleted = app
        .clone()
        .oneshot(delete_request(
            &format!("/api/v1/admin/forum/posts/{post_id}"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let comments = body_json(
        app.clone()
            .oneshot(get_request(
                &format!("/api/v1/admin/forum/comments?post_id={post_id}"),
                Some(&token),
            ))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(comments["total"], 0);

    let gone = app
        .oneshot(delete_request(
            &format!("/api/v1/admin/forum/posts/{post_id}"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_list_the_closed_set() {
    let app = test_router(lenient_admission());
    let token = login_token(&app).await;

    let body = body_json(
        app.oneshot(get_request("/api/v1/admin/forum/categories", Some(&token)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(
        body,
        json!(["EXPERIENCE", "CASE", "SKILL", "POLICY", "INSIGHT"])
    );
}
