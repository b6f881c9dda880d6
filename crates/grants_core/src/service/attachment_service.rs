//! Attachment store: file bytes in an upload directory, metadata in SQLite.
//!
//! # Invariants
//! - Files are written to `<upload_dir>/<sanitized file name>`; a second
//!   upload with the same name overwrites the first file.
//! - Metadata is inserted only after the bytes are on disk.
//! - `attach` does not check the extension allow-list; callers use
//!   `is_allowed` before reading the upload.

use crate::error::ErrorKind;
use crate::model::attachment::Attachment;
use crate::model::grant::GrantId;
use crate::repo::attachment_repo::AttachmentRepository;
use crate::repo::columns::now_utc;
use crate::repo::grant_repo::GrantRepository;
use crate::repo::RepoError;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static UNSAFE_FILE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._ \-]").expect("valid file name regex"));

#[derive(Debug)]
pub enum AttachmentError {
    GrantNotFound(GrantId),
    InvalidFileName(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Storage(RepoError),
}

impl AttachmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GrantNotFound(_) => ErrorKind::NotFound,
            Self::InvalidFileName(_) => ErrorKind::Validation,
            Self::Io { .. } | Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GrantNotFound(id) => write!(f, "grant not found: {id}"),
            Self::InvalidFileName(name) => write!(f, "invalid attachment file name `{name}`"),
            Self::Io { path, source } => {
                write!(f, "failed to write attachment `{}`: {source}", path.display())
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttachmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttachmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::GrantNotFound(id),
            other => Self::Storage(other),
        }
    }
}

pub struct AttachmentService<R: AttachmentRepository, G: GrantRepository> {
    attachments: R,
    grants: G,
    upload_dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl<R: AttachmentRepository, G: GrantRepository> AttachmentService<R, G> {
    /// `allowed_extensions` are matched case-insensitively, with or without
    /// a leading dot.
    pub fn new(
        attachments: R,
        grants: G,
        upload_dir: impl Into<PathBuf>,
        allowed_extensions: &[String],
    ) -> Self {
        Self {
            attachments,
            grants,
            upload_dir: upload_dir.into(),
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Allow-list check for the presentation layer.
    pub fn is_allowed(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    /// Writes `bytes` to the upload directory and records the metadata.
    pub fn attach(
        &self,
        grant_id: GrantId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Attachment, AttachmentError> {
        if self.grants.get_grant(grant_id)?.is_none() {
            return Err(AttachmentError::GrantNotFound(grant_id));
        }

        let safe_name = sanitize_file_name(file_name)
            .ok_or_else(|| AttachmentError::InvalidFileName(file_name.to_string()))?;

        std::fs::create_dir_all(&self.upload_dir).map_err(|source| AttachmentError::Io {
            path: self.upload_dir.clone(),
            source,
        })?;
        let path = self.upload_dir.join(&safe_name);
        if let Err(source) = std::fs::write(&path, bytes) {
            error!(
                "event=attachment_write module=attachment status=error grant_id={grant_id} error={source}"
            );
            return Err(AttachmentError::Io { path, source });
        }

        let attachment =
            self.attachments
                .insert_attachment(grant_id, &safe_name, &path, now_utc())?;
        info!(
            "event=attachment_write module=attachment status=ok grant_id={grant_id} attachment_id={} size_bytes={}",
            attachment.id,
            bytes.len()
        );
        Ok(attachment)
    }

    pub fn list_for_grant(&self, grant_id: GrantId) -> Result<Vec<Attachment>, AttachmentError> {
        Ok(self.attachments.list_for_grant(grant_id)?)
    }
}

/// Keeps only the final path component and replaces unsafe characters.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_file_name(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned = UNSAFE_FILE_NAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return None;
    }
    Some(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::sanitize_file_name;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(
            sanitize_file_name("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_file_name(r"C:\Users\me\proposal.pdf").as_deref(),
            Some("proposal.pdf")
        );
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_file_name("budget (v2)?.docx").as_deref(),
            Some("budget _v2__.docx")
        );
    }

    #[test]
    fn sanitize_rejects_empty_and_dot_names() {
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("uploads/"), None);
        assert_eq!(sanitize_file_name(".."), None);
    }
}
