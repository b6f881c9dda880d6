//! Credential storage for the `users` table.

use super::{RepoError, RepoResult};
use crate::model::user::UserRecord;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

pub trait UserRepository {
    /// Fails with `RepoError::Duplicate` when the username is taken.
    fn insert_user(&self, user: &UserRecord) -> RepoResult<()>;
    fn get_user(&self, username: &str) -> RepoResult<Option<UserRecord>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &UserRecord) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2);",
            params![user.username.as_str(), user.password_hash.as_str()],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::Duplicate(user.username.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT username, password_hash FROM users WHERE username = ?1;",
                [username],
                |row| {
                    Ok(UserRecord {
                        username: row.get(0)?,
                        password_hash: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
