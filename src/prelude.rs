//! Convenient imports for occrow.
//!
//! ```ignore
//! use occrow::prelude::*;
//!
//! let db = Database::open("./app.db")?;
//! db.migrate::<Account>()?;
//! ```

// Entry point
pub use occrow_engine::{Config, Database, DatabaseBuilder, ModelQuery};

// Error handling
pub use occrow_core::{Error, Result};

// Models
pub use occrow_core::{ColumnDef, FromValue, Model, Row, SqlType, Value, VersionField};

// Statements
pub use occrow_core::{CmpOp, Column, Expr};

// Versions
pub use occrow_core::{VersionGenerator, VersionStrategy, VersionToken};

// Updates
pub use occrow_concurrency::ConcurrentUpdateExt;
pub use occrow_core::{Changes, UpdateExecutor, UpdateOutcome};
