//! Password hashing and reset tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("hash password: {0}")]
    Hash(String),

    #[error("parse hash: {0}")]
    Parse(String),

    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Hash a password with Argon2id and a fresh salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored hash; parameters come from the hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Parse(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Argon2 is CPU-bound; run it off the async workers
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// Generate a reset token: 20 random bytes as hex. Only its digest is stored.
pub fn generate_reset_token() -> String {
    let bytes: [u8; 20] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 of a reset token, hex encoded
pub fn digest_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
