//! Credential verification against salted Argon2 hashes.
//!
//! `hash_password` is a provisioning-time operation (`cmd/seed`); request
//! handling only ever calls `verify_password`, which is a pure function of
//! its two inputs and never mutates the stored hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use domains::{DomainError, Result};
use secrecy::{ExposeSecret, SecretString};

/// Hashes a secret with Argon2id and a fresh random salt, producing a PHC
/// string suitable for storage.
pub fn hash_password(secret: &SecretString) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.expose_secret().as_bytes(), &salt)
        .map_err(|err| DomainError::internal(format!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// Verifies a candidate secret against a stored PHC hash.
///
/// A malformed stored hash is a verification failure, not a fatal error.
pub fn verify_password(candidate: &SecretString, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(candidate.expose_secret().as_bytes(), &parsed)
        .is_ok()
}
