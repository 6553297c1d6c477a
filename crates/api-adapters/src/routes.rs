//! Route table.
//!
//! Scoped so the binary can mount the API as-is; cross-cutting layers
//! (tracing, CORS) are applied by the binary, not here.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/me", get(handlers::me))
        .route(
            "/forum/posts",
            post(handlers::create_post).get(handlers::list_posts),
        )
        .route("/forum/posts/approve", put(handlers::approve_post))
        .route("/forum/posts/remove", put(handlers::remove_post))
        .route("/forum/posts/{post_id}", delete(handlers::delete_post))
        .route(
            "/forum/comments",
            post(handlers::create_comment).get(handlers::list_comments),
        )
        .route("/forum/comments/approve", put(handlers::approve_comment))
        .route("/forum/comments/remove", put(handlers::remove_comment))
        .route("/forum/comments/tree", get(handlers::comment_tree))
        .route("/forum/categories", get(handlers::categories));

    Router::new()
        .route("/api/v1/auth/login", post(handlers::login))
        .nest("/api/v1/admin", admin)
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}
