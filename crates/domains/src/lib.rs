//! # domains
//!
//! The central domain model for Warden: entities of the moderated forum
//! corpus, the closed status/category sets, the shared error type, and the
//! port traits every adapter crate implements.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
