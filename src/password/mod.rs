//! One-way password hashing for the local mirror.
//!
//! The hash is stored alongside the mirrored account but is never consulted
//! for auth decisions, the identity provider owns verification. It is carried
//! for a possible future local-auth fallback.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct HashError;

/// Hash a password using Argon2id with a fresh random salt.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| HashError)
}

/// Verify a password against a stored hash.
#[must_use]
pub fn verify(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
