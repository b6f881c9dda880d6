//! Caller-facing error classification.
//!
//! Every service error maps onto one `ErrorKind`, so a presentation layer
//! can decide between an inline message (`Validation`, `NotFound`,
//! `DuplicateUser`) and a generic failure (`Storage`) without matching on
//! each service's variants.

use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input shape or range.
    Validation,
    /// Referenced record is absent.
    NotFound,
    /// Registration conflict.
    DuplicateUser,
    /// Underlying persistence or file-system failure.
    Storage,
}

impl ErrorKind {
    /// Whether the message is safe and useful to show next to the input.
    pub fn is_user_facing(self) -> bool {
        !matches!(self, Self::Storage)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DuplicateUser => "duplicate_user",
            Self::Storage => "storage",
        };
        f.write_str(label)
    }
}
