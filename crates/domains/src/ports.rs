//! # Core Traits (Ports)
//!
//! Persistence contracts the adapter crates implement. The core treats the
//! durable store as an external collaborator: it receives and returns entity
//! values but never manages their durable lifetime itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AdminUser, Comment, ContentStatus, PageOf, PageRequest, Post, PostCategory,
};

/// Listing filter for posts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub status: Option<ContentStatus>,
    pub category: Option<PostCategory>,
}

/// Listing filter for comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentFilter {
    pub status: Option<ContentStatus>,
    pub post_id: Option<Uuid>,
}

/// Identity lookups and last-login bookkeeping.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait IdentityRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>>;

    /// Best-effort bookkeeping after a successful login.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;

    /// Provisioning entry point (`cmd/seed`); rejects duplicate usernames.
    async fn insert(&self, admin: AdminUser) -> Result<()>;
}

/// Data persistence contract for posts.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn insert(&self, post: Post) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Post>>;
    async fn update(&self, post: &Post) -> Result<()>;
    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<PageOf<Post>>;

    /// Deletes the post row only. Cascading to comments is the moderation
    /// engine's responsibility and must happen first.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Data persistence contract for comments.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn update(&self, comment: &Comment) -> Result<()>;
    async fn list(&self, filter: CommentFilter, page: PageRequest) -> Result<PageOf<Comment>>;

    /// The full flat set for one post, creation order. Input to the tree
    /// builder.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Deletes every comment referencing the post; returns the count.
    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64>;
}
