//! # Domain Models
//!
//! These structs represent the core entities of the moderated forum corpus.
//! Posts and comments are owned by the external store; this crate only
//! defines their shape and the closed status/category sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visibility lifecycle of a post or comment.
///
/// Every content item starts `Pending`. Only the moderation engine advances
/// the status; `approve` and `remove` are both legal from any state
/// (idempotent-by-overwrite rather than strictly linear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Pending,
    Approved,
    Removed,
}

impl ContentStatus {
    /// The storage-layer string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Removed => "removed",
        }
    }

    /// Parses the storage-layer string. An unknown value returns `None`;
    /// adapters must surface that as an integrity fault, never default it.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }
}

/// The fixed category set posts are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostCategory {
    Experience,
    Case,
    Skill,
    Policy,
    Insight,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Experience => "EXPERIENCE",
            Self::Case => "CASE",
            Self::Skill => "SKILL",
            Self::Policy => "POLICY",
            Self::Insight => "INSIGHT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EXPERIENCE" => Some(Self::Experience),
            "CASE" => Some(Self::Case),
            "SKILL" => Some(Self::Skill),
            "POLICY" => Some(Self::Policy),
            "INSIGHT" => Some(Self::Insight),
            _ => None,
        }
    }

    /// All categories, in storage order.
    pub fn all() -> [Self; 5] {
        [
            Self::Experience,
            Self::Case,
            Self::Skill,
            Self::Policy,
            Self::Insight,
        ]
    }
}

/// An administrative principal able to log in and moderate content.
///
/// Created by out-of-band provisioning (`cmd/seed`); the core never rewrites
/// the password hash and never deletes identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string; opaque to everything but the credential verifier.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A forum post awaiting or past moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub summary: Option<String>,
    pub category: PostCategory,
    pub status: ContentStatus,
    pub author_id: Uuid,
    /// Set on the first transition into `Approved`, never rewritten.
    pub publish_date: Option<DateTime<Utc>>,
    pub views: i64,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a post, optionally replying to another comment.
///
/// When `parent_id` is set the parent must exist and belong to the same
/// post; the moderation engine rejects violations at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub status: ContentStatus,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub publish_date: Option<DateTime<Utc>>,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a post. Carries no status field at all: content
/// cannot self-publish, every new post starts `Pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub category: PostCategory,
    pub author_id: Uuid,
}

/// Creation payload for a comment. Same policy as [`NewPost`]: no status.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub body: String,
    pub post_id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
}

/// 1-based pagination request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Serialize)]
pub struct PageOf<T> {
    pub total: u64,
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
}
