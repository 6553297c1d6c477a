//! In-memory repositories.
//!
//! DashMap-backed implementations of the storage ports. Listing collects,
//! sorts, then slices, so page boundaries are stable between calls over an
//! unchanged data set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use domains::{
    AdminUser, Comment, CommentFilter, CommentRepo, DomainError, IdentityRepo, PageOf,
    PageRequest, Post, PostFilter, PostRepo, Result,
};

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> PageOf<T> {
    let total = items.len() as u64;
    let offset = page.offset().min(total) as usize;
    let end = (offset + page.size as usize).min(items.len());
    let items = items.drain(offset..end).collect();
    PageOf {
        total,
        items,
        page: page.page,
        size: page.size,
    }
}

#[derive(Default)]
pub struct MemoryIdentityRepo {
    admins: DashMap<Uuid, AdminUser>,
}

impl MemoryIdentityRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/bootstrap helper: inserts without the duplicate-username check.
    pub fn seed(&self, admin: AdminUser) {
        self.admins.insert(admin.id, admin);
    }
}

#[async_trait]
impl IdentityRepo for MemoryIdentityRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        Ok(self
            .admins
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut admin = self
            .admins
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("AdminUser", id))?;
        admin.last_login = Some(at);
        Ok(())
    }

    async fn insert(&self, admin: AdminUser) -> Result<()> {
        if self
            .admins
            .iter()
            .any(|entry| entry.username == admin.username)
        {
            return Err(DomainError::Conflict(format!(
                "admin username '{}' already exists",
                admin.username
            )));
        }
        self.admins.insert(admin.id, admin);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPostRepo {
    posts: DashMap<Uuid, Post>,
}

impl MemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepo for MemoryPostRepo {
    async fn insert(&self, post: Post) -> Result<()> {
        self.posts.insert(post.id, post);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, post: &Post) -> Result<()> {
        match self.posts.get_mut(&post.id) {
            Some(mut entry) => {
                *entry = post.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("Post", post.id)),
        }
    }

    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<PageOf<Post>> {
        let mut matching: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| {
                filter.status.is_none_or(|s| entry.status == s)
                    && filter.category.is_none_or(|c| entry.category == c)
            })
            .map(|entry| entry.value().clone())
            .collect();
        // newest first, id as deterministic tie-break
        matching.sort_by_key(|p| (std::cmp::Reverse(p.created_at), p.id));
        Ok(paginate(matching, page))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.posts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Post", id))
    }
}

#[derive(Default)]
pub struct MemoryCommentRepo {
    comments: DashMap<Uuid, Comment>,
}

impl MemoryCommentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepo for MemoryCommentRepo {
    async fn insert(&self, comment: Comment) -> Result<()> {
        self.comments.insert(comment.id, comment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, comment: &Comment) -> Result<()> {
        match self.comments.get_mut(&comment.id) {
            Some(mut entry) => {
                *entry = comment.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("Comment", comment.id)),
        }
    }

    async fn list(&self, filter: CommentFilter, page: PageRequest) -> Result<PageOf<Comment>> {
        let mut matching: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| {
                filter.status.is_none_or(|s| entry.status == s)
                    && filter.post_id.is_none_or(|p| entry.post_id == p)
            })
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by_key(|c| (std::cmp::Reverse(c.created_at), c.id));
        Ok(paginate(matching, page))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let mut matching: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.post_id == post_id)
            .map(|entry| entry.value().clone())
            .collect();
        // creation order for the tree builder
        matching.sort_by_key(|c| (c.created_at, c.id));
        Ok(matching)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64> {
        let before = self.comments.len();
        self.comments.retain(|_, comment| comment.post_id != post_id);
        let removed = (before - self.comments.len()) as u64;
        tracing::debug!(%post_id, removed, "deleted comments for post");
        Ok(removed)
    }
}
