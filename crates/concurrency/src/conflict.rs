//! Conflict reporting for optimistic updates
//!
//! Each wrapper delegates to one of the builder's update entry points and,
//! when the engine reports zero affected rows, attaches
//! [`Error::ConcurrencyConflict`] to the outcome. Errors already on the
//! outcome stay in front. Nothing is retried or rolled back; the caller owns
//! that policy.
//!
//! Zero rows is the only signal, so a missing row and a stale version both
//! surface as a conflict.

use occrow_core::{Changes, Error, UpdateExecutor, UpdateOutcome, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Attach a conflict to `outcome` if it affected no rows
pub fn check_conflict(table: &str, mut outcome: UpdateOutcome) -> UpdateOutcome {
    if outcome.rows_affected == 0 {
        warn!(table, "optimistic update affected no rows");
        outcome.add_error(Error::conflict(table));
    }
    outcome
}

/// `update`, reporting a conflict on zero rows
pub fn concurrent_update<U: UpdateExecutor>(
    query: U,
    column: &str,
    value: impl Into<Value>,
) -> UpdateOutcome {
    let table = query.table().to_string();
    check_conflict(&table, query.update(column, value.into()))
}

/// `updates`, reporting a conflict on zero rows
pub fn concurrent_updates<U: UpdateExecutor>(query: U, changes: impl Into<Changes>) -> UpdateOutcome {
    let table = query.table().to_string();
    check_conflict(&table, query.updates(changes.into()))
}

/// `update_column`, reporting a conflict on zero rows
pub fn concurrent_update_column<U: UpdateExecutor>(
    query: U,
    column: &str,
    value: impl Into<Value>,
) -> UpdateOutcome {
    let table = query.table().to_string();
    check_conflict(&table, query.update_column(column, value.into()))
}

/// `update_columns`, reporting a conflict on zero rows
pub fn concurrent_update_columns<U: UpdateExecutor>(
    query: U,
    columns: BTreeMap<String, Value>,
) -> UpdateOutcome {
    let table = query.table().to_string();
    check_conflict(&table, query.update_columns(columns))
}

/// Method-call form of the `concurrent_*` wrappers
pub trait ConcurrentUpdateExt: UpdateExecutor + Sized {
    /// See [`concurrent_update`]
    fn concurrent_update(self, column: &str, value: impl Into<Value>) -> UpdateOutcome {
        concurrent_update(self, column, value)
    }

    /// See [`concurrent_updates`]
    fn concurrent_updates(self, changes: impl Into<Changes>) -> UpdateOutcome {
        concurrent_updates(self, changes)
    }

    /// See [`concurrent_update_column`]
    fn concurrent_update_column(self, column: &str, value: impl Into<Value>) -> UpdateOutcome {
        concurrent_update_column(self, column, value)
    }

    /// See [`concurrent_update_columns`]
    fn concurrent_update_columns(self, columns: BTreeMap<String, Value>) -> UpdateOutcome {
        concurrent_update_columns(self, columns)
    }
}

impl<U: UpdateExecutor> ConcurrentUpdateExt for U {}
