//! Attachment metadata repository.

use super::columns::{format_timestamp, parse_timestamp};
use super::{RepoError, RepoResult};
use crate::model::attachment::Attachment;
use crate::model::grant::GrantId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

pub trait AttachmentRepository {
    fn insert_attachment(
        &self,
        grant_id: GrantId,
        file_name: &str,
        file_path: &Path,
        uploaded_at: DateTime<Utc>,
    ) -> RepoResult<Attachment>;
    fn list_for_grant(&self, grant_id: GrantId) -> RepoResult<Vec<Attachment>>;
}

pub struct SqliteAttachmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttachmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttachmentRepository for SqliteAttachmentRepository<'_> {
    fn insert_attachment(
        &self,
        grant_id: GrantId,
        file_name: &str,
        file_path: &Path,
        uploaded_at: DateTime<Utc>,
    ) -> RepoResult<Attachment> {
        self.conn.execute(
            "INSERT INTO attachments (grant_id, file_name, file_path, uploaded_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                grant_id,
                file_name,
                file_path.to_string_lossy(),
                format_timestamp(uploaded_at)
            ],
        )?;

        Ok(Attachment {
            id: self.conn.last_insert_rowid(),
            grant_id,
            file_name: file_name.to_string(),
            file_path: file_path.to_path_buf(),
            uploaded_at,
        })
    }

    fn list_for_grant(&self, grant_id: GrantId) -> RepoResult<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, grant_id, file_name, file_path, uploaded_at
             FROM attachments
             WHERE grant_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([grant_id])?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next()? {
            attachments.push(parse_attachment_row(row)?);
        }
        Ok(attachments)
    }
}

fn parse_attachment_row(row: &Row<'_>) -> RepoResult<Attachment> {
    let id: i64 = row.get("id")?;
    let uploaded_text: String = row.get("uploaded_at")?;
    let uploaded_at = parse_timestamp(&uploaded_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid uploaded_at `{uploaded_text}` in attachments row {id}"
        ))
    })?;

    Ok(Attachment {
        id,
        grant_id: row.get("grant_id")?,
        file_name: row.get("file_name")?,
        file_path: PathBuf::from(row.get::<_, String>("file_path")?),
        uploaded_at,
    })
}
