//! # storage-adapters
//!
//! Implementations of the `domains` storage ports. The in-memory adapter is
//! always compiled and backs the default binary and the test suites; the
//! Postgres adapter sits behind the `db-postgres` feature.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;
