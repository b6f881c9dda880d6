//! Stored credential record.

/// Row of the `users` table.
///
/// `password_hash` is `<hex sha256(password + salt)>:<salt>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}
