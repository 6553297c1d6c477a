//! # DomainError
//!
//! Centralized error handling for the Warden ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g., Post, Comment, AdminUser)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., cross-thread parent, empty title)
    #[error("validation error: {0}")]
    Validation(String),

    /// Security/Auth failure (bad credentials, missing/expired/tampered token)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate admin username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Admission ceiling exceeded on the login surface
    #[error("too many requests: {0}")]
    RateLimited(String),

    /// Stored data violates an invariant the write path should have enforced
    /// (unknown status string, cyclic parent links)
    #[error("data integrity fault: {0}")]
    Integrity(String),

    /// Infrastructure failure (DB down, unexpected exception)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(resource.to_string(), id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A specialized Result type for Warden logic.
pub type Result<T> = std::result::Result<T, DomainError>;
