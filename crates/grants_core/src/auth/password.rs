//! Salted SHA-256 password hashing.
//!
//! Stored form is `<hex sha256(password + salt)>:<salt>`. The salt is a
//! simple-format UUID v4 (32 lowercase hex chars), so neither half can
//! contain the `:` delimiter.

use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Stored hash is not `<hash>:<salt>`.
    InvalidHash,
}

impl Display for PasswordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHash => write!(f, "invalid stored password hash format"),
        }
    }
}

impl Error for PasswordError {}

/// Hashes a password with a freshly generated salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}{DELIMITER}{salt}", digest(password, &salt))
}

/// Verifies a password against a stored `<hash>:<salt>` value.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored value is
/// malformed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let (expected, salt) = stored
        .split_once(DELIMITER)
        .filter(|(hash, salt)| !hash.is_empty() && !salt.is_empty())
        .ok_or(PasswordError::InvalidHash)?;
    Ok(digest(password, salt) == expected)
}

fn digest(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}
