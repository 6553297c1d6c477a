//! # services
//!
//! Domain logic over the storage ports: the moderation state machine for
//! posts and comments, and the reconstruction of nested reply trees from
//! flat parent links.

pub mod comment_tree;
pub mod moderation;

pub use comment_tree::{CommentForest, CommentNode};
pub use moderation::ModerationService;
