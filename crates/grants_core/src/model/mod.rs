//! Domain model for grant tracking.
//!
//! # Responsibility
//! - Define the typed records stored by repositories and returned to callers.
//! - Validate user input at the boundary (`GrantDraft::validate`).
//!
//! # Invariants
//! - `Grant::id` and `Grant::created_at` are assigned by storage and never
//!   change afterwards.
//! - Audit entries and attachments are append-only.

pub mod attachment;
pub mod audit;
pub mod grant;
pub mod user;
