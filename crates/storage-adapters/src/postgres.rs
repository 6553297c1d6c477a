//! Postgres repositories (feature `db-postgres`).
//!
//! Maps between the relational rows and the domain models. Status and
//! category travel as text; an unknown value coming back from storage is a
//! data-integrity fault, never silently defaulted. Schema provisioning is
//! owned by the deployment, not this crate; the expected tables are
//! `admin_users`, `forum_posts` and `forum_comments`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use domains::{
    AdminUser, Comment, CommentFilter, CommentRepo, ContentStatus, DomainError, IdentityRepo,
    PageOf, PageRequest, Post, PostCategory, PostFilter, PostRepo, Result,
};

fn storage_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return DomainError::Conflict(db.message().to_string());
        }
    }
    DomainError::internal(err)
}

fn status_from_row(row: &PgRow) -> Result<ContentStatus> {
    let raw: String = row.get("status");
    ContentStatus::parse(&raw)
        .ok_or_else(|| DomainError::integrity(format!("unknown status '{raw}' in storage")))
}

fn post_from_row(row: &PgRow) -> Result<Post> {
    let raw_category: String = row.get("category");
    let category = PostCategory::parse(&raw_category).ok_or_else(|| {
        DomainError::integrity(format!("unknown category '{raw_category}' in storage"))
    })?;
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        summary: row.get("summary"),
        category,
        status: status_from_row(row)?,
        author_id: row.get("author_id"),
        publish_date: row.get("publish_date"),
        views: row.get("views"),
        likes: row.get("likes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        body: row.get("body"),
        status: status_from_row(row)?,
        post_id: row.get("post_id"),
        parent_id: row.get("parent_id"),
        author_id: row.get("author_id"),
        publish_date: row.get("publish_date"),
        likes: row.get("likes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub struct PgIdentityRepo {
    pool: PgPool,
}

impl PgIdentityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepo for PgIdentityRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, is_active, created_at, last_login \
             FROM admin_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(|row| AdminUser {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            last_login: row.get("last_login"),
        }))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE admin_users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn insert(&self, admin: AdminUser) -> Result<()> {
        sqlx::query(
            "INSERT INTO admin_users (id, username, password_hash, is_active, created_at, last_login) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(admin.id)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(admin.is_active)
        .bind(admin.created_at)
        .bind(admin.last_login)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn insert(&self, post: Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO forum_posts \
             (id, title, body, summary, category, status, author_id, publish_date, views, likes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.summary)
        .bind(post.category.as_str())
        .bind(post.status.as_str())
        .bind(post.author_id)
        .bind(post.publish_date)
        .bind(post.views)
        .bind(post.likes)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM forum_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.map(|row| post_from_row(&row)).transpose()
    }

    async fn update(&self, post: &Post) -> Result<()> {
        let result = sqlx::query(
            "UPDATE forum_posts SET title = $2, body = $3, summary = $4, category = $5, \
             status = $6, publish_date = $7, views = $8, likes = $9, updated_at = $10 \
             WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(&post.summary)
        .bind(post.category.as_str())
        .bind(post.status.as_str())
        .bind(post.publish_date)
        .bind(post.views)
        .bind(post.likes)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Post", post.id));
        }
        Ok(())
    }

    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<PageOf<Post>> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) AS total FROM forum_posts WHERE TRUE");
        let mut select = QueryBuilder::new("SELECT * FROM forum_posts WHERE TRUE");
        for builder in [&mut count, &mut select] {
            if let Some(status) = filter.status {
                builder.push(" AND status = ").push_bind(status.as_str());
            }
            if let Some(category) = filter.category {
                builder.push(" AND category = ").push_bind(category.as_str());
            }
        }
        select.push(" ORDER BY created_at DESC, id");
        select.push(" LIMIT ").push_bind(i64::from(page.size));
        select.push(" OFFSET ").push_bind(page.offset() as i64);

        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?
            .get("total");
        let items = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .iter()
            .map(post_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(PageOf {
            total: total as u64,
            items,
            page: page.page,
            size: page.size,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Post", id));
        }
        Ok(())
    }
}

pub struct PgCommentRepo {
    pool: PgPool,
}

impl PgCommentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepo for PgCommentRepo {
    async fn insert(&self, comment: Comment) -> Result<()> {
        sqlx::query(
            "INSERT INTO forum_comments \
             (id, body, status, post_id, parent_id, author_id, publish_date, likes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(comment.id)
        .bind(&comment.body)
        .bind(comment.status.as_str())
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.author_id)
        .bind(comment.publish_date)
        .bind(comment.likes)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM forum_comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        row.map(|row| comment_from_row(&row)).transpose()
    }

    async fn update(&self, comment: &Comment) -> Result<()> {
        let result = sqlx::query(
            "UPDATE forum_comments SET body = $2, status = $3, publish_date = $4, \
             likes = $5, updated_at = $6 WHERE id = $1",
        )
        .bind(comment.id)
        .bind(&comment.body)
        .bind(comment.status.as_str())
        .bind(comment.publish_date)
        .bind(comment.likes)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Comment", comment.id));
        }
        Ok(())
    }

    async fn list(&self, filter: CommentFilter, page: PageRequest) -> Result<PageOf<Comment>> {
        let mut count =
            QueryBuilder::new("SELECT COUNT(*) AS total FROM forum_comments WHERE TRUE");
        let mut select = QueryBuilder::new("SELECT * FROM forum_comments WHERE TRUE");
        for builder in [&mut count, &mut select] {
            if let Some(status) = filter.status {
                builder.push(" AND status = ").push_bind(status.as_str());
            }
            if let Some(post_id) = filter.post_id {
                builder.push(" AND post_id = ").push_bind(post_id);
            }
        }
        select.push(" ORDER BY created_at DESC, id");
        select.push(" LIMIT ").push_bind(i64::from(page.size));
        select.push(" OFFSET ").push_bind(page.offset() as i64);

        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?
            .get("total");
        let items = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .iter()
            .map(comment_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(PageOf {
            total: total as u64,
            items,
            page: page.page,
            size: page.size,
        })
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        sqlx::query("SELECT * FROM forum_comments WHERE post_id = $1 ORDER BY created_at, id")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .iter()
            .map(comment_from_row)
            .collect()
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM forum_comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        tracing::debug!(%post_id, removed = result.rows_affected(), "deleted comments for post");
        Ok(result.rows_affected())
    }
}
