//! The moderation lifecycle for posts and comments.
//!
//! Every content item enters as `Pending`; only this service advances the
//! status. `approve` and `remove` overwrite rather than step a strict
//! ladder, so re-approval and re-removal are legal. The service computes
//! the next valid state and hands the mutated entity back to the store; it
//! never manages durable lifetime itself.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use domains::{
    Comment, CommentFilter, CommentRepo, ContentStatus, DomainError, NewComment, NewPost, PageOf,
    PageRequest, Post, PostFilter, PostRepo, Result,
};

use crate::comment_tree::CommentForest;

pub struct ModerationService {
    posts: Arc<dyn PostRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl ModerationService {
    pub fn new(posts: Arc<dyn PostRepo>, comments: Arc<dyn CommentRepo>) -> Self {
        Self { posts, comments }
    }

    /// Creates a post in `Pending` state. The draft carries no status, so
    /// content cannot self-publish.
    pub async fn create_post(&self, draft: NewPost) -> Result<Post> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::validation("post title cannot be empty"));
        }
        if draft.body.trim().is_empty() {
            return Err(DomainError::validation("post body cannot be empty"));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: draft.title,
            body: draft.body,
            summary: draft.summary,
            category: draft.category,
            status: ContentStatus::Pending,
            author_id: draft.author_id,
            publish_date: None,
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        self.posts.insert(post.clone()).await?;
        Ok(post)
    }

    /// Creates a comment in `Pending` state.
    ///
    /// The post must exist; a parent, when given, must exist and belong to
    /// the same post. Violations are rejections, never silent corrections.
    pub async fn create_comment(&self, draft: NewComment) -> Result<Comment> {
        if draft.body.trim().is_empty() {
            return Err(DomainError::validation("comment body cannot be empty"));
        }

        let post = self
            .posts
            .get(draft.post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", draft.post_id))?;

        if let Some(parent_id) = draft.parent_id {
            let parent = self
                .comments
                .get(parent_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Parent comment", parent_id))?;
            if parent.post_id != post.id {
                return Err(DomainError::validation(
                    "parent comment belongs to a different post",
                ));
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            body: draft.body,
            status: ContentStatus::Pending,
            post_id: draft.post_id,
            parent_id: draft.parent_id,
            author_id: draft.author_id,
            publish_date: None,
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        self.comments.insert(comment.clone()).await?;
        Ok(comment)
    }

    /// Approves a post. The publish date is set on the first approval only
    /// and survives any later remove/approve cycle.
    pub async fn approve_post(&self, id: Uuid) -> Result<Post> {
        let mut post = self
            .posts
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        let now = Utc::now();
        post.status = ContentStatus::Approved;
        post.publish_date.get_or_insert(now);
        post.updated_at = now;
        self.posts.update(&post).await?;
        info!(post_id = %id, "post approved");
        Ok(post)
    }

    /// Removes a post from visibility. The publish date is kept: removal
    /// hides content, it does not rewrite history.
    pub async fn remove_post(&self, id: Uuid) -> Result<Post> {
        let mut post = self
            .posts
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        post.status = ContentStatus::Removed;
        post.updated_at = Utc::now();
        self.posts.update(&post).await?;
        info!(post_id = %id, "post removed");
        Ok(post)
    }

    pub async fn approve_comment(&self, id: Uuid) -> Result<Comment> {
        let mut comment = self
            .comments
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))?;

        let now = Utc::now();
        comment.status = ContentStatus::Approved;
        comment.publish_date.get_or_insert(now);
        comment.updated_at = now;
        self.comments.update(&comment).await?;
        info!(comment_id = %id, "comment approved");
        Ok(comment)
    }

    pub async fn remove_comment(&self, id: Uuid) -> Result<Comment> {
        let mut comment = self
            .comments
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))?;

        comment.status = ContentStatus::Removed;
        comment.updated_at = Utc::now();
        self.comments.update(&comment).await?;
        info!(comment_id = %id, "comment removed");
        Ok(comment)
    }

    /// Deletes a post and everything under it: comments first, then the
    /// post. No cascade exists in the other direction.
    pub async fn delete_post(&self, id: Uuid) -> Result<()> {
        if self.posts.get(id).await?.is_none() {
            return Err(DomainError::not_found("Post", id));
        }
        let comments_removed = self.comments.delete_by_post(id).await?;
        self.posts.delete(id).await?;
        info!(post_id = %id, comments_removed, "post deleted with its comments");
        Ok(())
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post> {
        self.posts
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn list_posts(&self, filter: PostFilter, page: PageRequest) -> Result<PageOf<Post>> {
        self.posts.list(filter, page).await
    }

    pub async fn list_comments(
        &self,
        filter: CommentFilter,
        page: PageRequest,
    ) -> Result<PageOf<Comment>> {
        self.comments.list(filter, page).await
    }

    /// The nested reply forest for one post, rebuilt from the flat comment
    /// set on every call.
    pub async fn comment_tree(&self, post_id: Uuid) -> Result<CommentForest> {
        if self.posts.get(post_id).await?.is_none() {
            return Err(DomainError::not_found("Post", post_id));
        }
        let flat = self.comments.list_for_post(post_id).await?;
        CommentForest::build(&flat)
    }
}
