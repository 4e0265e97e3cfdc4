//! Seams between the statement builder and the code that plugs into it
//!
//! - [`StatementHook`]: lifecycle callbacks the builder invokes before an
//!   INSERT or UPDATE is rendered.
//! - [`UpdateExecutor`]: the builder's four update entry points, and
//!   [`UpdateOutcome`], the result object they return.

use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::value::Value;
use std::collections::BTreeMap;

/// Callbacks invoked on a statement before it is rendered
///
/// Both default to no-ops so a hook only implements the phase it cares
/// about.
pub trait StatementHook<R>: Send + Sync {
    /// Called once per record per INSERT
    fn before_insert(&self, _stmt: &mut Statement, _record: &mut R) -> Result<()> {
        Ok(())
    }

    /// Called before an UPDATE; the host may call it more than once for the
    /// same statement
    fn before_update(&self, _stmt: &mut Statement, _record: &mut R) -> Result<()> {
        Ok(())
    }
}

/// Values for a multi-column update
#[derive(Debug, Clone, PartialEq)]
pub enum Changes {
    /// Every non-null column of the bound record
    Model,
    /// Explicit column map
    Columns(BTreeMap<String, Value>),
}

impl Changes {
    /// Single-entry column map
    pub fn column(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(column.into(), value.into());
        Changes::Columns(map)
    }
}

impl From<BTreeMap<String, Value>> for Changes {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Changes::Columns(map)
    }
}

/// Result of an update: affected rows plus any accumulated errors
///
/// Errors are kept in the order they were attached. The host's own
/// execution error, when there is one, is always first.
#[derive(Debug, Default)]
pub struct UpdateOutcome {
    /// Rows the engine reported as changed
    pub rows_affected: u64,
    errors: Vec<Error>,
}

impl UpdateOutcome {
    /// Successful outcome
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            errors: Vec::new(),
        }
    }

    /// Failed outcome
    pub fn failed(error: Error) -> Self {
        Self {
            rows_affected: 0,
            errors: vec![error],
        }
    }

    /// Attach an error, keeping earlier ones
    pub fn add_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// First error, if any
    pub fn error(&self) -> Option<&Error> {
        self.errors.first()
    }

    /// All errors in attachment order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Whether a concurrency conflict was attached
    pub fn is_conflict(&self) -> bool {
        self.errors.iter().any(Error::is_conflict)
    }

    /// `Ok(rows_affected)`, or the first error
    pub fn into_result(self) -> Result<u64> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.rows_affected),
        }
    }
}

/// The builder's update surface
///
/// `update` and `updates` run model lifecycle hooks; the `*_column(s)`
/// variants skip them. All four run statement hooks.
pub trait UpdateExecutor {
    /// Table the update targets
    fn table(&self) -> &str;

    /// Update one column
    fn update(self, column: &str, value: Value) -> UpdateOutcome;

    /// Update the whole record or a column map
    fn updates(self, changes: Changes) -> UpdateOutcome;

    /// Update one column without lifecycle hooks
    fn update_column(self, column: &str, value: Value) -> UpdateOutcome;

    /// Update a column map without lifecycle hooks
    fn update_columns(self, columns: BTreeMap<String, Value>) -> UpdateOutcome;
}
