//! Authentication service: registration, verification and login.
//!
//! # Invariants
//! - Plain passwords are never stored or logged.
//! - `AuthenticatedUser` can only be obtained through `login` (or the
//!   internal system identity used by seeding), so every mutation that
//!   takes one is gated behind valid credentials.
//!
//! There is no rate limiting or lockout.

use crate::auth::{hash_password, verify_password, PasswordError};
use crate::error::ErrorKind;
use crate::model::user::UserRecord;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SYSTEM_USER: &str = "system";

/// Proof of a successful login, carried into audited operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    username: String,
}

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn system() -> Self {
        Self {
            username: SYSTEM_USER.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    EmptyUsername,
    EmptyPassword,
    DuplicateUser(String),
    /// Stored hash for this user is malformed.
    CorruptCredential {
        username: String,
        source: PasswordError,
    },
    Storage(RepoError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyUsername | Self::EmptyPassword => ErrorKind::Validation,
            Self::DuplicateUser(_) => ErrorKind::DuplicateUser,
            Self::CorruptCredential { .. } | Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username cannot be empty"),
            Self::EmptyPassword => write!(f, "password cannot be empty"),
            Self::DuplicateUser(username) => write!(f, "user already exists: {username}"),
            Self::CorruptCredential { username, source } => {
                write!(f, "stored credential for `{username}` is unreadable: {source}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptCredential { source, .. } => Some(source),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate(username) => Self::DuplicateUser(username),
            other => Self::Storage(other),
        }
    }
}

pub struct AuthService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Registers a new user with a salted password hash.
    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: hash_password(password),
        };
        match self.users.insert_user(&record) {
            Ok(()) => {
                info!("event=user_register module=auth status=ok username={username}");
                Ok(())
            }
            Err(err) => {
                let err = AuthError::from(err);
                warn!(
                    "event=user_register module=auth status=error username={username} error_kind={}",
                    err.kind()
                );
                Err(err)
            }
        }
    }

    /// Returns whether the credentials match; unknown users yield `false`.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let username = username.trim();
        let Some(record) = self.users.get_user(username)? else {
            return Ok(false);
        };

        verify_password(password, &record.password_hash).map_err(|source| {
            AuthError::CorruptCredential {
                username: username.to_string(),
                source,
            }
        })
    }

    /// Verifies credentials and returns the identity used for audited
    /// operations.
    pub fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedUser>, AuthError> {
        if self.verify(username, password)? {
            info!("event=user_login module=auth status=ok username={}", username.trim());
            Ok(Some(AuthenticatedUser {
                username: username.trim().to_string(),
            }))
        } else {
            warn!("event=user_login module=auth status=denied");
            Ok(None)
        }
    }
}
