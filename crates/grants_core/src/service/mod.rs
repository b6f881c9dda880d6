//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Pair every grant mutation with its audit entry.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod attachment_service;
pub mod audit_service;
pub mod auth_service;
pub mod grant_service;
pub mod seed;
