//! Core domain logic for the grant tracker.
//! This crate is the single source of truth for business invariants.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analytics::{
    dashboard_summary, upcoming_deadlines, DashboardSummary, FunderTotal, FundingAnalytics,
    ThemeAverage,
};
pub use config::{AppConfig, ConfigError};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attachment::Attachment;
pub use model::audit::{AuditAction, AuditEntry};
pub use model::grant::{Currency, Grant, GrantDraft, GrantId, GrantStatus, GrantValidationError};
pub use repo::attachment_repo::{AttachmentRepository, SqliteAttachmentRepository};
pub use repo::audit_repo::{AuditRepository, SqliteAuditRepository};
pub use repo::grant_repo::{GrantRepository, SqliteGrantRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attachment_service::{AttachmentError, AttachmentService};
pub use service::audit_service::{AuditLogger, RECENT_AUDIT_LIMIT};
pub use service::auth_service::{AuthError, AuthService, AuthenticatedUser};
pub use service::grant_service::{
    DeleteConfirmation, GrantService, GrantServiceError, MutationOutcome,
};
pub use service::seed::seed_sample_grants;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
