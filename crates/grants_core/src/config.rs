//! Application configuration loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file is
//! valid. Unknown keys are rejected to catch typos early.

use crate::analytics::DEFAULT_UPCOMING_WINDOW_DAYS;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "grants.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory receiving uploaded attachment bytes.
    pub upload_dir: PathBuf,
    /// File extensions accepted for attachments.
    pub allowed_extensions: Vec<String>,
    pub upcoming_window_days: u32,
    pub log_level: String,
    /// Rolling log directory; file logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("grants.db"),
            upload_dir: PathBuf::from("uploads"),
            allowed_extensions: vec!["pdf".to_string(), "docx".to_string()],
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config TOML: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl AppConfig {
    /// Reads and validates a config file; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path cannot be empty".to_string(),
            ));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("upload_dir cannot be empty".to_string()));
        }
        if let Some(ext) = self
            .allowed_extensions
            .iter()
            .find(|ext| ext.trim().trim_start_matches('.').is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "allowed_extensions contains an empty entry `{ext}`"
            )));
        }
        if self.upcoming_window_days == 0 {
            return Err(ConfigError::Invalid(
                "upcoming_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
