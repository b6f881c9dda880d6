//! Attachment metadata model.
//!
//! Only metadata lives in the database; bytes live in the upload directory
//! at `file_path`.

use super::grant::GrantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub grant_id: GrantId,
    /// Sanitized file name as written to the upload directory.
    pub file_name: String,
    pub file_path: PathBuf,
    pub uploaded_at: DateTime<Utc>,
}
