//! Nested reply reconstruction.
//!
//! The store keeps comments flat, linked by parent reference. This module
//! projects one post's comments into a forest: null-parent comments are
//! roots, children are ordered by creation time. Construction is pure and
//! repeatable; the resulting forest can be walked any number of times.
//!
//! Stored parent links are not trusted. Write-time validation is supposed
//! to prevent cycles and dangling parents, but the builder re-checks both
//! and surfaces violations as integrity faults instead of looping or
//! silently dropping comments.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use domains::{Comment, DomainError, Result};

/// Hard bound on reply nesting accepted at construction time.
const MAX_REPLY_DEPTH: usize = 128;

/// One comment with its ordered replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// The reply forest of a single post.
#[derive(Debug, Clone, Serialize)]
pub struct CommentForest {
    roots: Vec<CommentNode>,
}

impl CommentForest {
    /// Builds the forest from the flat comment set of one post.
    ///
    /// Each comment holds at most one parent reference, so a node can be
    /// reached from the roots at most once; any comment left unreached
    /// after construction sits on a cycle. Dangling parent references and
    /// duplicate ids are rejected up front.
    pub fn build(comments: &[Comment]) -> Result<Self> {
        let mut by_parent: HashMap<Uuid, Vec<&Comment>> = HashMap::new();
        let mut roots_src: Vec<&Comment> = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::with_capacity(comments.len());

        for comment in comments {
            if !seen.insert(comment.id) {
                return Err(DomainError::integrity(format!(
                    "duplicate comment id {}",
                    comment.id
                )));
            }
        }
        for comment in comments {
            match comment.parent_id {
                None => roots_src.push(comment),
                Some(parent_id) => {
                    if !seen.contains(&parent_id) {
                        return Err(DomainError::integrity(format!(
                            "comment {} references missing parent {}",
                            comment.id, parent_id
                        )));
                    }
                    by_parent.entry(parent_id).or_default().push(comment);
                }
            }
        }

        let mut built = 0usize;
        let mut roots = Vec::with_capacity(roots_src.len());
        sort_siblings(&mut roots_src);
        for root in roots_src {
            roots.push(attach(root, &mut by_parent, 0, &mut built)?);
        }

        if built != comments.len() {
            return Err(DomainError::integrity(format!(
                "comment parent links form a cycle ({} of {} comments reachable)",
                built,
                comments.len()
            )));
        }

        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    /// Consumes the forest into its root nodes, the shape the API returns.
    pub fn into_roots(self) -> Vec<CommentNode> {
        self.roots
    }

    /// Total number of comments in the forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Maximum nesting depth; a lone root counts as depth 1.
    pub fn depth(&self) -> usize {
        fn node_depth(node: &CommentNode) -> usize {
            1 + node.replies.iter().map(node_depth).max().unwrap_or(0)
        }
        self.roots.iter().map(node_depth).max().unwrap_or(0)
    }

    /// Depth-first traversal, parents before replies. Borrowing and
    /// restartable: the forest is never consumed.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a CommentNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.replies.iter().rev());
        Some(node)
    }
}

fn sort_siblings(siblings: &mut [&Comment]) {
    // id as tie-break keeps ordering deterministic for equal timestamps
    siblings.sort_by_key(|c| (c.created_at, c.id));
}

fn attach(
    comment: &Comment,
    by_parent: &mut HashMap<Uuid, Vec<&Comment>>,
    depth: usize,
    built: &mut usize,
) -> Result<CommentNode> {
    if depth >= MAX_REPLY_DEPTH {
        return Err(DomainError::integrity(format!(
            "reply nesting exceeds depth bound of {MAX_REPLY_DEPTH}"
        )));
    }

    *built += 1;
    let mut node = CommentNode {
        comment: comment.clone(),
        replies: Vec::new(),
    };

    if let Some(mut children) = by_parent.remove(&comment.id) {
        sort_siblings(&mut children);
        node.replies.reserve(children.len());
        for child in children {
            node.replies.push(attach(child, by_parent, depth + 1, built)?);
        }
    }

    Ok(node)
}
