//! Process configuration read once from the environment.
//!
//! Variables:
//! - `SECRET`: required. Symmetric key for signing session tokens.
//! - `TASKLIST_DB_PATH`: optional. SQLite file path, defaults to `tasklist.db`.
//! - `TASKLIST_LOG_LEVEL`: optional. Defaults to [`default_log_level`].
//! - `TASKLIST_LOG_DIR`: optional absolute path. File logging is off when unset.
//!
//! # Invariants
//! - The loaded config is immutable; nothing reloads it mid-process.
//! - The signing secret never appears in `Debug` output.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

pub const SECRET_VAR: &str = "SECRET";
pub const DB_PATH_VAR: &str = "TASKLIST_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "TASKLIST_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "TASKLIST_LOG_DIR";

const DEFAULT_DB_PATH: &str = "tasklist.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    EmptyVar(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "missing required environment variable `{name}`"),
            Self::EmptyVar(name) => write!(f, "environment variable `{name}` must not be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Token signing secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyVar(SECRET_VAR));
        }
        Ok(Self(secret.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for TokenSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// Startup configuration for the task-list core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token_secret: TokenSecret,
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(SECRET_VAR).ok_or(ConfigError::MissingVar(SECRET_VAR))?;
        let token_secret = TokenSecret::new(secret)?;

        let database_path = non_blank(lookup(DB_PATH_VAR))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        let log_level =
            non_blank(lookup(LOG_LEVEL_VAR)).unwrap_or_else(|| default_log_level().to_string());
        let log_dir = non_blank(lookup(LOG_DIR_VAR)).map(PathBuf::from);

        Ok(Self {
            token_secret,
            database_path,
            log_level,
            log_dir,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
