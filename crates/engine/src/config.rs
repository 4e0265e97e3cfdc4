//! Database configuration
//!
//! A [`Config`] can be built in code through
//! [`DatabaseBuilder`](crate::DatabaseBuilder) or loaded from TOML:
//!
//! ```toml
//! path = "/var/lib/app/app.db"   # omit for an in-memory database
//! version_strategy = "time_ordered"
//! busy_timeout_ms = 2000
//! log_statements = true
//! ```

use occrow_core::{Error, Result, VersionStrategy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default time SQLite waits on a locked database
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Database file; `None` opens an in-memory database
    pub path: Option<PathBuf>,
    /// How new row versions are generated
    pub version_strategy: VersionStrategy,
    /// Milliseconds to wait on a locked database before failing
    pub busy_timeout_ms: u64,
    /// Log every rendered statement at INFO instead of TRACE
    pub log_statements: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            version_strategy: VersionStrategy::default(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_statements: false,
        }
    }
}

impl Config {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Whether this configuration opens an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}
