//! Core types for occrow
//!
//! This crate defines the vocabulary shared by the OCC protocol and the
//! statement builder it plugs into:
//! - [`VersionToken`]: the opaque per-row version and its encodings
//! - [`Statement`]: an INSERT/UPDATE under construction
//! - [`Model`] / [`VersionField`]: compile-time field bindings for records
//! - [`StatementHook`] / [`UpdateExecutor`]: the builder's extension seams
//! - [`Error`]: the error type, including `ConcurrencyConflict`
//!
//! Enable the `rusqlite` feature for SQLite `ToSql`/`FromSql` impls.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hook;
pub mod record;
#[cfg(feature = "rusqlite")]
pub mod sqlite;
pub mod statement;
pub mod value;
pub mod version;

pub use error::{Error, Result};
pub use hook::{Changes, StatementHook, UpdateExecutor, UpdateOutcome};
pub use record::{ColumnDef, FromValue, Model, Row, SqlType, VersionField};
pub use statement::{
    Assignment, Assignments, CmpOp, Column, Expr, Statement, StatementKind, TableRef, Where,
};
pub use value::Value;
pub use version::{
    RandomUuid, TimeOrderedUuid, VersionGenerator, VersionStrategy, VersionToken,
};
