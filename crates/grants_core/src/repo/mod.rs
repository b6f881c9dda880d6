//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per table.
//! - Keep SQL and column encoding details out of services.
//!
//! # Invariants
//! - Grant writes call `GrantDraft::validate()` before any SQL mutation.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to DB transport errors.
//! - Repositories only borrow the connection; they never open or migrate it.

use crate::db::DbError;
use crate::model::grant::{GrantId, GrantValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attachment_repo;
pub mod audit_repo;
pub(crate) mod columns;
pub mod grant_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all table repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(GrantValidationError),
    Db(DbError),
    NotFound(GrantId),
    /// Unique key already taken (e.g. a username).
    Duplicate(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "grant not found: {id}"),
            Self::Duplicate(key) => write!(f, "duplicate key: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Duplicate(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<GrantValidationError> for RepoError {
    fn from(value: GrantValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
