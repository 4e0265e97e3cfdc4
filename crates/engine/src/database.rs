//! Database handle
//!
//! [`Database`] owns one SQLite connection and drives statement
//! construction for [`Model`] types: it builds the statement, runs the
//! model's statement hooks, renders SQL and executes it. Models that declare
//! a version field get a [`VersionInterceptor`] installed automatically.
//!
//! ```ignore
//! let db = Database::in_memory()?;
//! db.migrate::<Account>()?;
//!
//! let mut account = Account::new(1, "alice");
//! db.create(&mut account)?;           // version stamped
//!
//! db.model(&mut account)
//!     .concurrent_update("name", "bob")
//!     .into_result()?;                // conflict if someone got there first
//! ```

use crate::config::Config;
use crate::query::ModelQuery;
use crate::sql::{self, Rendered};
use occrow_concurrency::VersionInterceptor;
use occrow_core::{
    Model, Result, Row, Statement, StatementHook, Value, VersionGenerator,
};
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// A database connection plus the hooks configured for it
///
/// # Thread Safety
///
/// The connection is guarded by a mutex, so a `Database` can be shared
/// behind an `Arc`. Each statement runs under the lock; optimistic checks
/// across handles rely on SQLite's own atomic UPDATE.
pub struct Database {
    conn: Mutex<Connection>,
    config: Config,
    generator: Arc<dyn VersionGenerator>,
}

impl Database {
    /// Open (or create) a database file with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::builder().in_memory().open()
    }

    /// Create a builder for database configuration
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Open a database from a loaded [`Config`]
    pub fn from_config(config: Config) -> Result<Self> {
        let generator = config.version_strategy.generator();
        Self::with_generator(config, generator)
    }

    fn with_generator(config: Config, generator: Arc<dyn VersionGenerator>) -> Result<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        // SQLite takes the timeout as a C int of milliseconds
        let busy_ms = config.busy_timeout_ms.min(i32::MAX as u64);
        conn.busy_timeout(Duration::from_millis(busy_ms))?;

        info!(
            path = ?config.path,
            strategy = ?config.version_strategy,
            "opened database"
        );
        Ok(Self {
            conn: Mutex::new(conn),
            config,
            generator,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the table for `R` if it does not exist
    pub fn migrate<R: Model>(&self) -> Result<()> {
        let sql = sql::create_table::<R>();
        debug!(table = R::TABLE, "migrating");
        self.conn.lock().execute_batch(&sql)?;
        Ok(())
    }

    /// Insert `record`
    ///
    /// Runs insert hooks first, so a versioned record comes back carrying
    /// the version that was written. If the insert fails the record keeps
    /// the version it had before the call.
    pub fn create<R: Model>(&self, record: &mut R) -> Result<()> {
        let field = R::version_field();
        let previous = field.map(|f| f.get(record).clone());

        let result = self.insert(record);

        if result.is_err() {
            if let (Some(field), Some(previous)) = (field, previous) {
                field.set(record, previous);
            }
        }
        result
    }

    fn insert<R: Model>(&self, record: &mut R) -> Result<()> {
        let mut stmt = Statement::insert(R::TABLE);
        for (column, value) in record.values() {
            stmt.assignments_mut().set(column, value);
        }
        for hook in self.hooks::<R>() {
            hook.before_insert(&mut stmt, record)?;
        }
        let rendered = sql::render(&mut stmt)?;
        self.execute(&rendered)?;
        Ok(())
    }

    /// Fetch a record by primary key
    pub fn first<R: Model>(&self, primary_key: impl Into<Value>) -> Result<Option<R>> {
        let rows = self.query(R::TABLE, &sql::select::<R>(true), &[primary_key.into()])?;
        rows.first().map(R::from_row).transpose()
    }

    /// Fetch every record of `R`, ordered by primary key
    pub fn find_all<R: Model>(&self) -> Result<Vec<R>> {
        let rows = self.query(R::TABLE, &sql::select::<R>(false), &[])?;
        rows.iter().map(R::from_row).collect()
    }

    /// Start an update scoped to `record`
    pub fn model<'a, R: Model>(&'a self, record: &'a mut R) -> ModelQuery<'a, R> {
        ModelQuery::new(self, record)
    }

    /// Execute SQL as-is, bypassing statement hooks
    pub fn execute_raw(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.execute(&Rendered {
            sql: sql.to_string(),
            params: params.to_vec(),
        })
    }

    /// Statement hooks for `R`
    pub(crate) fn hooks<R: Model>(&self) -> Vec<Box<dyn StatementHook<R>>> {
        let mut hooks: Vec<Box<dyn StatementHook<R>>> = Vec::new();
        if let Some(field) = R::version_field() {
            hooks.push(Box::new(VersionInterceptor::with_generator(
                field,
                Arc::clone(&self.generator),
            )));
        }
        hooks
    }

    pub(crate) fn execute(&self, rendered: &Rendered) -> Result<u64> {
        self.log(rendered);
        let conn = self.conn.lock();
        let changed = conn.execute(&rendered.sql, params_from_iter(rendered.params.iter()))?;
        Ok(changed as u64)
    }

    fn query(&self, table: &str, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        trace!(sql, "query");
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            out.push(Row::new(table, columns.clone(), values));
        }
        Ok(out)
    }

    fn log(&self, rendered: &Rendered) {
        if self.config.log_statements {
            info!(sql = %rendered.sql, params = ?rendered.params, "execute");
        } else {
            trace!(sql = %rendered.sql, params = ?rendered.params, "execute");
        }
    }
}

/// Builder for database configuration
///
/// # Example
///
/// ```ignore
/// let db = Database::builder()
///     .path("./app.db")
///     .version_strategy(VersionStrategy::TimeOrdered)
///     .busy_timeout(Duration::from_secs(2))
///     .open()?;
/// ```
pub struct DatabaseBuilder {
    config: Config,
    generator: Option<Arc<dyn VersionGenerator>>,
}

impl DatabaseBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            generator: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the database file path
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a private in-memory database (the default)
    pub fn in_memory(mut self) -> Self {
        self.config.path = None;
        self
    }

    /// Choose a built-in version generator
    pub fn version_strategy(mut self, strategy: occrow_core::VersionStrategy) -> Self {
        self.config.version_strategy = strategy;
        self.generator = None;
        self
    }

    /// Use a custom version generator; overrides the strategy
    pub fn version_generator(mut self, generator: Arc<dyn VersionGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// How long to wait on a locked database
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Log rendered statements at INFO
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.config.log_statements = enabled;
        self
    }

    /// Open the database
    pub fn open(self) -> Result<Database> {
        let generator = self
            .generator
            .unwrap_or_else(|| self.config.version_strategy.generator());
        Database::with_generator(self.config, generator)
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
