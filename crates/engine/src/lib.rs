//! SQLite engine for occrow
//!
//! This crate is the host the concurrency layer plugs into:
//! - [`Database`]: connection handle, schema creation, inserts and reads
//! - [`ModelQuery`]: the UPDATE builder, implementing
//!   [`UpdateExecutor`](occrow_core::UpdateExecutor)
//! - [`sql`]: statement rendering
//! - [`Config`]: settings, loadable from TOML
//!
//! Every model that declares a version field gets a
//! [`VersionInterceptor`](occrow_concurrency::VersionInterceptor) on each
//! INSERT and UPDATE. Atomicity of each UPDATE's match-and-write comes from
//! SQLite.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod query;
pub mod sql;

pub use config::{Config, DEFAULT_BUSY_TIMEOUT_MS};
pub use database::{Database, DatabaseBuilder};
pub use query::ModelQuery;
