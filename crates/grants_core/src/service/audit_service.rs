//! Audit logger over the append-only audit trail.

use crate::model::audit::{AuditAction, AuditEntry};
use crate::model::grant::GrantId;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::columns::now_utc;
use crate::repo::RepoResult;
use log::{info, warn};

/// Number of entries shown in the "recent actions" view.
pub const RECENT_AUDIT_LIMIT: u32 = 10;

pub struct AuditLogger<A: AuditRepository> {
    repo: A,
}

impl<A: AuditRepository> AuditLogger<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Appends one timestamped entry.
    ///
    /// Callers that perform the mutation should treat an error as a warning,
    /// not as a failure of the mutation itself.
    pub fn record(
        &self,
        grant_id: GrantId,
        action: AuditAction,
        user: &str,
    ) -> RepoResult<AuditEntry> {
        match self.repo.append_entry(grant_id, action, user, now_utc()) {
            Ok(entry) => {
                info!(
                    "event=audit_record module=audit status=ok grant_id={grant_id} action={action} audit_id={}",
                    entry.id
                );
                Ok(entry)
            }
            Err(err) => {
                warn!(
                    "event=audit_record module=audit status=error grant_id={grant_id} action={action} error={err}"
                );
                Err(err)
            }
        }
    }

    /// Most recent `limit` entries, newest first.
    pub fn list_recent(&self, limit: u32) -> RepoResult<Vec<AuditEntry>> {
        self.repo.list_recent(limit)
    }

    pub fn list_all(&self) -> RepoResult<Vec<AuditEntry>> {
        self.repo.list_all()
    }

    pub fn list_for_grant(&self, grant_id: GrantId) -> RepoResult<Vec<AuditEntry>> {
        self.repo.list_for_grant(grant_id)
    }
}
