//! Audit trail entry model.

use super::grant::GrantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Mutating action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Deleted => "Deleted",
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Created" => Ok(Self::Created),
            "Updated" => Ok(Self::Updated),
            "Deleted" => Ok(Self::Deleted),
            other => Err(format!("unknown audit action `{other}`")),
        }
    }
}

/// One append-only audit record.
///
/// `grant_id` may reference a grant that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub grant_id: GrantId,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}
