//! Error types shared by the protocol and its host
//!
//! [`Error::ConcurrencyConflict`] is the only kind the OCC protocol itself
//! produces. Everything else is the host's generic failure surface (storage,
//! marshaling, model definition) and passes through the protocol untouched.

use thiserror::Error;

/// All occrow errors.
#[derive(Debug, Error)]
pub enum Error {
    /// An optimistic update matched no rows.
    ///
    /// Either the row no longer exists or its stored version differs from
    /// the one the caller observed. The two cases are not distinguished.
    #[error("concurrency conflict: update of {table} affected no rows")]
    ConcurrencyConflict {
        /// Table the update targeted
        table: String,
    },

    /// A version token could not be decoded
    #[error("invalid version token: {0}")]
    InvalidVersion(String),

    /// Wrong value type for a column
    #[error("wrong type for {column}: expected {expected}, got {actual}")]
    WrongType {
        /// Column being decoded
        column: String,
        /// Expected type
        expected: &'static str,
        /// Actual type found
        actual: &'static str,
    },

    /// Column is not part of the model
    #[error("unknown column {column} on {table}")]
    UnknownColumn {
        /// Table name
        table: String,
        /// Offending column
        column: String,
    },

    /// Update statement carries no assignments
    #[error("nothing to update on {0}")]
    EmptyUpdate(String),

    /// Update statement carries no filter
    #[error("refusing to update {0} without a filter")]
    MissingFilter(String),

    /// A model lifecycle hook refused the write
    #[error("rejected by model: {0}")]
    Rejected(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage driver error
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for occrow operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a conflict error for `table`.
    pub fn conflict(table: impl Into<String>) -> Self {
        Error::ConcurrencyConflict {
            table: table.into(),
        }
    }

    /// Check if this is a concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::ConcurrencyConflict { .. })
    }

    /// Check if this error is retryable.
    ///
    /// Conflicts may succeed on retry after re-reading the row.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(feature = "rusqlite")]
impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
