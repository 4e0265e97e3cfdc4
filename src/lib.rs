//! # occrow
//!
//! Optimistic concurrency control for row updates.
//!
//! A model that declares a version field gets a fresh version token on every
//! INSERT and UPDATE. Each UPDATE also only matches the row if its stored
//! version still equals the one the caller last saw, so a writer working
//! from a stale copy changes nothing. The `concurrent_*` wrappers turn that
//! "zero rows affected" into [`Error::ConcurrencyConflict`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use occrow::prelude::*;
//!
//! let db = Database::in_memory()?;
//! db.migrate::<Account>()?;
//!
//! let mut account = Account { id: 1, name: "alice".into(), version: VersionToken::absent() };
//! db.create(&mut account)?;
//!
//! let mut stale = db.first::<Account>(1)?.unwrap();
//!
//! db.model(&mut account).concurrent_update("name", "bob").into_result()?;
//!
//! let outcome = db.model(&mut stale).concurrent_update("name", "carol");
//! assert!(outcome.is_conflict());
//! ```
//!
//! ## Crates
//!
//! - `occrow-core`: values, records, statements, version tokens, errors
//! - `occrow-concurrency`: the version interceptor and conflict wrappers
//! - `occrow-engine`: SQLite-backed database handle and update builder

#![warn(missing_docs)]

pub mod prelude;

pub use occrow_concurrency::{ConcurrentUpdateExt, VersionInterceptor};
pub use occrow_core::{Error, Model, Result, UpdateExecutor, UpdateOutcome, VersionToken};
pub use occrow_engine::{Config, Database, DatabaseBuilder, ModelQuery};
