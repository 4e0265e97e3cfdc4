//! Concurrency layer for occrow
//!
//! This crate implements optimistic concurrency control (OCC) for row
//! updates:
//! - [`VersionInterceptor`]: stamps versions on INSERT, adds the
//!   expected-version predicate and the next version on UPDATE
//! - [`normalize_filter`]: keeps the version predicate conjunctive
//! - `concurrent_*` wrappers: turn "zero rows affected" into
//!   `Error::ConcurrencyConflict`
//!
//! Correctness across writers rests on the engine executing each UPDATE's
//! match-and-write atomically; this crate only shapes the predicate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conflict;
pub mod interceptor;

pub use conflict::{
    check_conflict, concurrent_update, concurrent_update_column, concurrent_update_columns,
    concurrent_updates, ConcurrentUpdateExt,
};
pub use interceptor::{normalize_filter, VersionInterceptor, VERSION_UPDATE_PHASE};
