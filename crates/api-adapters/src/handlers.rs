//! Request handlers.
//!
//! The login path runs the admission check before credentials are even
//! looked at; every `/api/v1/admin` handler requires a valid bearer
//! assertion via the [`CurrentAdmin`](crate::extract::CurrentAdmin)
//! extractor.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use auth_adapters::{Admission, IssuedToken, Principal};
use domains::{
    Comment, CommentFilter, ContentStatus, DomainError, NewComment, NewPost, PageOf, PageRequest,
    Post, PostCategory, PostFilter,
};
use services::CommentNode;

use crate::error::ApiError;
use crate::extract::{ClientKey, CurrentAdmin};
use crate::metrics::{ContentKind, LoginOutcome, ModerationAction};
use crate::state::AppState;

const THROTTLED_DETAIL: &str = "Too many login attempts. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ClientKey(key): ClientKey,
    Form(form): Form<LoginForm>,
) -> Result<Json<IssuedToken>, ApiError> {
    // fail closed: an undeterminable client key counts as a denial
    let admitted = match &key {
        Some(key) => state.admission.admit(key) == Admission::Allowed,
        None => {
            warn!("could not determine client key for login attempt; denying");
            false
        }
    };
    if !admitted {
        state.metrics.record_login(LoginOutcome::Throttled);
        return Err(DomainError::RateLimited(THROTTLED_DETAIL.to_string()).into());
    }

    let password = SecretString::from(form.password);
    match state.authenticator.login(&form.username, &password).await {
        Ok(issued) => {
            state.metrics.record_login(LoginOutcome::Issued);
            Ok(Json(issued))
        }
        Err(err) => {
            state.metrics.record_login(LoginOutcome::Rejected);
            Err(err.into())
        }
    }
}

pub async fn me(CurrentAdmin(principal): CurrentAdmin) -> Json<Principal> {
    Json(principal)
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub status: Option<ContentStatus>,
    pub category: Option<PostCategory>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    pub status: Option<ContentStatus>,
    pub post_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

#[derive(Debug, Deserialize)]
pub struct PostActionQuery {
    pub post_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CommentActionQuery {
    pub comment_id: Uuid,
}

pub async fn create_post(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(draft): Json<NewPost>,
) -> Result<Json<Post>, ApiError> {
    let post = state.moderation.create_post(draft).await?;
    Ok(Json(post))
}

pub async fn list_posts(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PageOf<Post>>, ApiError> {
    let filter = PostFilter {
        status: query.status,
        category: query.category,
    };
    let page = PageRequest::new(query.page, query.size);
    Ok(Json(state.moderation.list_posts(filter, page).await?))
}

pub async fn approve_post(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<PostActionQuery>,
) -> Result<Json<Post>, ApiError> {
    let post = state.moderation.approve_post(query.post_id).await?;
    state
        .metrics
        .record_moderation(ModerationAction::Approve, ContentKind::Post);
    Ok(Json(post))
}

pub async fn remove_post(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<PostActionQuery>,
) -> Result<Json<Post>, ApiError> {
    let post = state.moderation.remove_post(query.post_id).await?;
    state
        .metrics
        .record_moderation(ModerationAction::Remove, ContentKind::Post);
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.moderation.delete_post(post_id).await?;
    state
        .metrics
        .record_moderation(ModerationAction::Delete, ContentKind::Post);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_comment(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(draft): Json<NewComment>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.moderation.create_comment(draft).await?;
    Ok(Json(comment))
}

pub async fn list_comments(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<PageOf<Comment>>, ApiError> {
    let filter = CommentFilter {
        status: query.status,
        post_id: query.post_id,
    };
    let page = PageRequest::new(query.page, query.size);
    Ok(Json(state.moderation.list_comments(filter, page).await?))
}

pub async fn approve_comment(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<CommentActionQuery>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.moderation.approve_comment(query.comment_id).await?;
    state
        .metrics
        .record_moderation(ModerationAction::Approve, ContentKind::Comment);
    Ok(Json(comment))
}

pub async fn remove_comment(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<CommentActionQuery>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state.moderation.remove_comment(query.comment_id).await?;
    state
        .metrics
        .record_moderation(ModerationAction::Remove, ContentKind::Comment);
    Ok(Json(comment))
}

pub async fn comment_tree(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(query): Query<PostActionQuery>,
) -> Result<Json<Vec<CommentNode>>, ApiError> {
    let forest = state.moderation.comment_tree(query.post_id).await?;
    Ok(Json(forest.into_roots()))
}

pub async fn categories(_admin: CurrentAdmin) -> Json<Vec<PostCategory>> {
    Json(PostCategory::all().to_vec())
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        state.metrics.encode(),
    )
        .into_response()
}
