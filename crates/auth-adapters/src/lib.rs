//! # auth-adapters
//!
//! The identity layer: credential verification against salted Argon2
//! hashes, stateless signed session assertions, the login admission
//! throttle, and the authenticator orchestrating all three.

pub mod admission;
pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod authenticator;
#[cfg(feature = "auth-jwt")]
pub mod token;

pub use admission::{Admission, AdmissionConfig, AdmissionController};
pub use password::{hash_password, verify_password};

#[cfg(feature = "auth-jwt")]
pub use authenticator::{Authenticator, IssuedToken};
#[cfg(feature = "auth-jwt")]
pub use token::{Principal, TokenCodec};
