//! Audit trail repository contract and SQLite implementation.
//!
//! # Invariants
//! - The table is append-only: this module exposes no update or delete.
//! - Reads are ordered by `timestamp DESC, id DESC` so entries written in
//!   the same microsecond keep reverse insertion order.

use super::columns::{format_timestamp, parse_timestamp};
use super::{RepoError, RepoResult};
use crate::model::audit::{AuditAction, AuditEntry};
use crate::model::grant::GrantId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Params, Row};

const AUDIT_SELECT_SQL: &str = "SELECT id, grant_id, action, timestamp, user FROM audit_trail";
const AUDIT_ORDER_SQL: &str = "ORDER BY timestamp DESC, id DESC";

pub trait AuditRepository {
    fn append_entry(
        &self,
        grant_id: GrantId,
        action: AuditAction,
        user: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<AuditEntry>;
    fn list_recent(&self, limit: u32) -> RepoResult<Vec<AuditEntry>>;
    fn list_all(&self) -> RepoResult<Vec<AuditEntry>>;
    fn list_for_grant(&self, grant_id: GrantId) -> RepoResult<Vec<AuditEntry>>;
}

pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_entries(&self, sql: &str, params: impl Params) -> RepoResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_audit_row(row)?);
        }
        Ok(entries)
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append_entry(
        &self,
        grant_id: GrantId,
        action: AuditAction,
        user: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<AuditEntry> {
        self.conn.execute(
            "INSERT INTO audit_trail (grant_id, action, timestamp, user)
             VALUES (?1, ?2, ?3, ?4);",
            params![grant_id, action.as_str(), format_timestamp(at), user],
        )?;

        Ok(AuditEntry {
            id: self.conn.last_insert_rowid(),
            grant_id,
            action,
            timestamp: at,
            user: user.to_string(),
        })
    }

    fn list_recent(&self, limit: u32) -> RepoResult<Vec<AuditEntry>> {
        self.query_entries(
            &format!("{AUDIT_SELECT_SQL} {AUDIT_ORDER_SQL} LIMIT ?1;"),
            [i64::from(limit)],
        )
    }

    fn list_all(&self) -> RepoResult<Vec<AuditEntry>> {
        self.query_entries(&format!("{AUDIT_SELECT_SQL} {AUDIT_ORDER_SQL};"), [])
    }

    fn list_for_grant(&self, grant_id: GrantId) -> RepoResult<Vec<AuditEntry>> {
        self.query_entries(
            &format!("{AUDIT_SELECT_SQL} WHERE grant_id = ?1 {AUDIT_ORDER_SQL};"),
            [grant_id],
        )
    }
}

fn parse_audit_row(row: &Row<'_>) -> RepoResult<AuditEntry> {
    let id: i64 = row.get("id")?;

    let action_text: String = row.get("action")?;
    let action = action_text
        .parse::<AuditAction>()
        .map_err(|message| RepoError::InvalidData(format!("{message} in audit_trail row {id}")))?;

    let timestamp_text: String = row.get("timestamp")?;
    let timestamp = parse_timestamp(&timestamp_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{timestamp_text}` in audit_trail row {id}"
        ))
    })?;

    Ok(AuditEntry {
        id,
        grant_id: row.get("grant_id")?,
        action,
        timestamp,
        user: row.get::<_, Option<String>>("user")?.unwrap_or_default(),
    })
}
