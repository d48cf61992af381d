//! Password hashing and verification.
//!
//! Hashes are Argon2id PHC strings with a fresh random salt per call, so hashing the
//! same password twice never yields the same string.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hashing(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
}

/// hash_password
///
/// One-way hash of `plaintext`. Fails only on an internal library/RNG error.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(CredentialError::Hashing)
}

/// verify_password
///
/// `Ok(false)` on a well-formed hash that does not match; `Err` only when the stored
/// hash cannot be parsed.
pub fn verify_password(hash: &str, plaintext: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(hash).map_err(CredentialError::MalformedHash)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::MalformedHash(e)),
    }
}
