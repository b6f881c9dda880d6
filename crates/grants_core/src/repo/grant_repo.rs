//! Grant repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed CRUD over the `grants` table.
//! - Decode stored text columns into `Grant` values.
//!
//! # Invariants
//! - Create and update validate the draft before SQL runs.
//! - Update never touches `id` or `created_at`.
//! - Listing is ordered by `id ASC` and re-queries storage on every call.
//! - Unparsable date text reads back as `None`; unknown enum text is
//!   reported as `InvalidData`.

use super::columns::{
    decimal_from_value, format_date, format_decimal, format_timestamp, now_utc,
    parse_date_lenient, parse_timestamp,
};
use super::{RepoError, RepoResult};
use crate::model::grant::{Currency, Grant, GrantDraft, GrantId, GrantStatus};
use log::debug;
use rusqlite::{params, Connection, Row};

const GRANT_SELECT_SQL: &str = "SELECT
    id,
    title,
    funder,
    funding_amount,
    currency,
    theme,
    status,
    deadline,
    submitted_date,
    description,
    organization_involved,
    key_personnel,
    created_at
FROM grants";

/// Repository interface for grant CRUD operations.
pub trait GrantRepository {
    fn create_grant(&self, draft: &GrantDraft) -> RepoResult<Grant>;
    fn update_grant(&self, id: GrantId, draft: &GrantDraft) -> RepoResult<Grant>;
    fn get_grant(&self, id: GrantId) -> RepoResult<Option<Grant>>;
    /// Lowest id wins when several grants share a title.
    fn find_grant_by_title(&self, title: &str) -> RepoResult<Option<Grant>>;
    fn list_grants(&self) -> RepoResult<Vec<Grant>>;
    fn delete_grant(&self, id: GrantId) -> RepoResult<()>;
    fn count_grants(&self) -> RepoResult<u64>;
}

/// SQLite-backed grant repository.
pub struct SqliteGrantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGrantRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GrantRepository for SqliteGrantRepository<'_> {
    fn create_grant(&self, draft: &GrantDraft) -> RepoResult<Grant> {
        draft.validate()?;
        let created_at = now_utc();

        self.conn.execute(
            "INSERT INTO grants (
                title,
                funder,
                funding_amount,
                currency,
                theme,
                status,
                deadline,
                submitted_date,
                description,
                organization_involved,
                key_personnel,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                draft.title.as_str(),
                draft.funder.as_str(),
                format_decimal(draft.funding_amount),
                draft.currency.as_str(),
                draft.theme.as_str(),
                draft.status.as_str(),
                draft.deadline.map(format_date),
                draft.submitted_date.map(format_date),
                draft.description.as_str(),
                draft.organization_involved.as_str(),
                draft.key_personnel.as_str(),
                format_timestamp(created_at),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=grant_insert module=repo status=ok grant_id={id}");
        Ok(Grant::from_draft(id, created_at, draft.clone()))
    }

    fn update_grant(&self, id: GrantId, draft: &GrantDraft) -> RepoResult<Grant> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE grants
             SET
                title = ?1,
                funder = ?2,
                funding_amount = ?3,
                currency = ?4,
                theme = ?5,
                status = ?6,
                deadline = ?7,
                submitted_date = ?8,
                description = ?9,
                organization_involved = ?10,
                key_personnel = ?11
             WHERE id = ?12;",
            params![
                draft.title.as_str(),
                draft.funder.as_str(),
                format_decimal(draft.funding_amount),
                draft.currency.as_str(),
                draft.theme.as_str(),
                draft.status.as_str(),
                draft.deadline.map(format_date),
                draft.submitted_date.map(format_date),
                draft.description.as_str(),
                draft.organization_involved.as_str(),
                draft.key_personnel.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_grant(id)?.ok_or(RepoError::NotFound(id))
    }

    fn get_grant(&self, id: GrantId) -> RepoResult<Option<Grant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GRANT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_grant_row(row)?));
        }
        Ok(None)
    }

    fn find_grant_by_title(&self, title: &str) -> RepoResult<Option<Grant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GRANT_SELECT_SQL} WHERE title = ?1 ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([title.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_grant_row(row)?));
        }
        Ok(None)
    }

    fn list_grants(&self) -> RepoResult<Vec<Grant>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GRANT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut grants = Vec::new();
        while let Some(row) = rows.next()? {
            grants.push(parse_grant_row(row)?);
        }
        Ok(grants)
    }

    fn delete_grant(&self, id: GrantId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM grants WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_grants(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM grants;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn parse_grant_row(row: &Row<'_>) -> RepoResult<Grant> {
    let id: GrantId = row.get("id")?;

    let funding_amount = decimal_from_value(row.get_ref("funding_amount")?).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid funding_amount in grants row {id}"))
    })?;

    let currency = match row.get::<_, Option<String>>("currency")? {
        Some(value) => value.parse::<Currency>().map_err(|_| {
            RepoError::InvalidData(format!("invalid currency `{value}` in grants row {id}"))
        })?,
        None => Currency::default(),
    };

    let status = match row.get::<_, Option<String>>("status")? {
        Some(value) => value.parse::<GrantStatus>().map_err(|_| {
            RepoError::InvalidData(format!("invalid status `{value}` in grants row {id}"))
        })?,
        None => GrantStatus::default(),
    };

    let created_at_text: String = row.get("created_at")?;
    let created_at = parse_timestamp(&created_at_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid created_at `{created_at_text}` in grants row {id}"
        ))
    })?;

    let deadline = parse_date_lenient(row.get::<_, Option<String>>("deadline")?.as_deref());
    let submitted_date =
        parse_date_lenient(row.get::<_, Option<String>>("submitted_date")?.as_deref());

    Ok(Grant {
        id,
        title: text_or_empty(row, "title")?,
        funder: text_or_empty(row, "funder")?,
        funding_amount,
        currency,
        theme: text_or_empty(row, "theme")?,
        status,
        deadline,
        submitted_date,
        description: text_or_empty(row, "description")?,
        organization_involved: text_or_empty(row, "organization_involved")?,
        key_personnel: text_or_empty(row, "key_personnel")?,
        created_at,
    })
}

fn text_or_empty(row: &Row<'_>, column: &str) -> RepoResult<String> {
    Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
}
