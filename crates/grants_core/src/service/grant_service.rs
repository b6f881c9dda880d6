//! Grant use-case service.
//!
//! # Responsibility
//! - Provide the create/update/delete/read entry points used by the UI.
//! - Record exactly one audit entry per successful mutation.
//!
//! # Invariants
//! - Mutations require an `AuthenticatedUser`.
//! - Delete requires an explicit `DeleteConfirmation::Confirmed`.
//! - An audit failure never rolls back or fails the grant write; it is
//!   returned as `MutationOutcome::audit_warning` instead.

use crate::error::ErrorKind;
use crate::model::audit::AuditAction;
use crate::model::grant::{Grant, GrantDraft, GrantId, GrantValidationError};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::RepoError;
use crate::service::audit_service::AuditLogger;
use crate::service::auth_service::AuthenticatedUser;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Explicit answer to "really delete this grant?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
    Unconfirmed,
}

impl From<bool> for DeleteConfirmation {
    fn from(value: bool) -> Self {
        if value {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome<T> {
    pub value: T,
    /// Set when the grant write succeeded but its audit entry did not.
    pub audit_warning: Option<String>,
}

#[derive(Debug)]
pub enum GrantServiceError {
    Validation(GrantValidationError),
    ConfirmationRequired(GrantId),
    NotFound(GrantId),
    TitleNotFound(String),
    Storage(RepoError),
}

impl GrantServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::ConfirmationRequired(_) => ErrorKind::Validation,
            Self::NotFound(_) | Self::TitleNotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for GrantServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConfirmationRequired(id) => {
                write!(f, "deleting grant {id} requires confirmation")
            }
            Self::NotFound(id) => write!(f, "grant not found: {id}"),
            Self::TitleNotFound(title) => write!(f, "no grant titled `{title}`"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GrantServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GrantServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

pub struct GrantService<G: GrantRepository, A: AuditRepository> {
    grants: G,
    audit: AuditLogger<A>,
}

impl<G: GrantRepository, A: AuditRepository> GrantService<G, A> {
    pub fn new(grants: G, audit: A) -> Self {
        Self {
            grants,
            audit: AuditLogger::new(audit),
        }
    }

    /// Audit logger sharing this service's audit repository.
    pub fn audit(&self) -> &AuditLogger<A> {
        &self.audit
    }

    /// All grants in id order, freshly read from storage.
    pub fn list(&self) -> Result<Vec<Grant>, GrantServiceError> {
        Ok(self.grants.list_grants()?)
    }

    pub fn count(&self) -> Result<u64, GrantServiceError> {
        Ok(self.grants.count_grants()?)
    }

    pub fn get(&self, id: GrantId) -> Result<Grant, GrantServiceError> {
        self.grants
            .get_grant(id)?
            .ok_or(GrantServiceError::NotFound(id))
    }

    pub fn find_by_title(&self, title: &str) -> Result<Grant, GrantServiceError> {
        self.grants
            .find_grant_by_title(title)?
            .ok_or_else(|| GrantServiceError::TitleNotFound(title.to_string()))
    }

    pub fn create(
        &self,
        user: &AuthenticatedUser,
        draft: GrantDraft,
    ) -> Result<MutationOutcome<Grant>, GrantServiceError> {
        let grant = self
            .grants
            .create_grant(&draft)
            .map_err(|err| log_failure("grant_create", None, err))?;
        info!(
            "event=grant_create module=grant_service status=ok grant_id={} user={}",
            grant.id,
            user.username()
        );
        let audit_warning = self.audit_after(grant.id, AuditAction::Created, user);
        Ok(MutationOutcome {
            value: grant,
            audit_warning,
        })
    }

    pub fn update(
        &self,
        user: &AuthenticatedUser,
        id: GrantId,
        draft: GrantDraft,
    ) -> Result<MutationOutcome<Grant>, GrantServiceError> {
        let grant = self
            .grants
            .update_grant(id, &draft)
            .map_err(|err| log_failure("grant_update", Some(id), err))?;
        info!(
            "event=grant_update module=grant_service status=ok grant_id={id} user={}",
            user.username()
        );
        let audit_warning = self.audit_after(id, AuditAction::Updated, user);
        Ok(MutationOutcome {
            value: grant,
            audit_warning,
        })
    }

    pub fn delete(
        &self,
        user: &AuthenticatedUser,
        id: GrantId,
        confirmation: DeleteConfirmation,
    ) -> Result<MutationOutcome<GrantId>, GrantServiceError> {
        if confirmation != DeleteConfirmation::Confirmed {
            return Err(GrantServiceError::ConfirmationRequired(id));
        }

        self.grants
            .delete_grant(id)
            .map_err(|err| log_failure("grant_delete", Some(id), err))?;
        info!(
            "event=grant_delete module=grant_service status=ok grant_id={id} user={}",
            user.username()
        );
        let audit_warning = self.audit_after(id, AuditAction::Deleted, user);
        Ok(MutationOutcome {
            value: id,
            audit_warning,
        })
    }

    fn audit_after(
        &self,
        grant_id: GrantId,
        action: AuditAction,
        user: &AuthenticatedUser,
    ) -> Option<String> {
        self.audit
            .record(grant_id, action, user.username())
            .err()
            .map(|err| format!("{action} grant {grant_id} was saved but not audited: {err}"))
    }
}

fn log_failure(event: &str, grant_id: Option<GrantId>, err: RepoError) -> GrantServiceError {
    let err = GrantServiceError::from(err);
    let grant_id = grant_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match err.kind() {
        ErrorKind::Storage => error!(
            "event={event} module=grant_service status=error grant_id={grant_id} error_kind=storage error={err}"
        ),
        kind => warn!(
            "event={event} module=grant_service status=rejected grant_id={grant_id} error_kind={kind}"
        ),
    }
    err
}
