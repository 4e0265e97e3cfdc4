//! Records and their column bindings
//!
//! A [`Model`] describes a record type to the statement builder: its table,
//! columns, how to turn an instance into column values and back, and which
//! field (if any) holds its [`VersionToken`]. Field access is bound at
//! compile time through [`VersionField`] accessor pairs; nothing here
//! inspects types at runtime.

use crate::error::{Error, Result};
use crate::value::Value;
use crate::version::VersionToken;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// 64-bit integer
    Integer,
    /// Floating point
    Real,
    /// UTF-8 text
    Text,
    /// Binary
    Blob,
    /// Boolean
    Boolean,
    /// UUID-compatible text; the type of version columns
    Uuid,
}

/// Column definition used for schema creation and column validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name
    pub name: &'static str,
    /// Storage type
    pub sql_type: SqlType,
    /// Whether NULL is allowed
    pub nullable: bool,
    /// Whether this is the primary key
    pub primary_key: bool,
}

impl ColumnDef {
    /// Non-null column
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            primary_key: false,
        }
    }

    /// Primary key column
    pub const fn primary_key(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            primary_key: true,
        }
    }

    /// Version column: nullable [`SqlType::Uuid`]
    pub const fn version(name: &'static str) -> Self {
        Self {
            name,
            sql_type: SqlType::Uuid,
            nullable: true,
            primary_key: false,
        }
    }

    /// Allow NULL
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Accessor pair for a record's version field
///
/// Bound once per model type, typically in [`Model::version_field`]:
///
/// ```
/// use occrow_core::{VersionField, VersionToken};
///
/// struct Account {
///     version: VersionToken,
/// }
///
/// let field = VersionField::<Account>::new("version", |a| &a.version, |a| &mut a.version);
/// let mut account = Account { version: VersionToken::default() };
/// assert!(field.is_unset(&account));
///
/// field.set(&mut account, VersionToken::new());
/// assert!(!field.is_unset(&account));
/// ```
pub struct VersionField<R> {
    column: &'static str,
    get: fn(&R) -> &VersionToken,
    get_mut: fn(&mut R) -> &mut VersionToken,
}

impl<R> VersionField<R> {
    /// Bind `column` to the given accessors
    pub const fn new(
        column: &'static str,
        get: fn(&R) -> &VersionToken,
        get_mut: fn(&mut R) -> &mut VersionToken,
    ) -> Self {
        Self {
            column,
            get,
            get_mut,
        }
    }

    /// Column name
    pub fn column(&self) -> &'static str {
        self.column
    }

    /// Current token on `record`
    pub fn get<'a>(&self, record: &'a R) -> &'a VersionToken {
        (self.get)(record)
    }

    /// Whether no version has been supplied on `record`
    pub fn is_unset(&self, record: &R) -> bool {
        !self.get(record).is_present()
    }

    /// Replace the token on `record`
    pub fn set(&self, record: &mut R, token: VersionToken) {
        *(self.get_mut)(record) = token;
    }
}

impl<R> Clone for VersionField<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for VersionField<R> {}

impl<R> std::fmt::Debug for VersionField<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionField")
            .field("column", &self.column)
            .finish()
    }
}

/// A record type mapped to one table
pub trait Model: Sized + 'static {
    /// Table name
    const TABLE: &'static str;

    /// Primary key column
    const PRIMARY_KEY: &'static str;

    /// Column definitions, in storage order
    fn columns() -> Vec<ColumnDef>;

    /// Column values of this record, primary key included
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Build a record from a fetched row
    fn from_row(row: &Row) -> Result<Self>;

    /// Primary key value of this record
    fn primary_key(&self) -> Value;

    /// Version field, for models under optimistic concurrency control
    fn version_field() -> Option<VersionField<Self>> {
        None
    }

    /// Lifecycle hook run before `update`/`updates`.
    ///
    /// Not run by `update_column`/`update_columns`. Returning an error
    /// aborts the write.
    fn before_update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Conversion out of a storage scalar
pub trait FromValue: Sized {
    /// Convert `value` read from `column`
    fn from_value(column: &str, value: Value) -> Result<Self>;
}

fn wrong_type(column: &str, expected: &'static str, actual: &Value) -> Error {
    Error::WrongType {
        column: column.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

impl FromValue for i64 {
    fn from_value(column: &str, value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(wrong_type(column, "Int", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(column: &str, value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(wrong_type(column, "Float", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            // SQLite has no boolean storage class
            Value::Int(i) => Ok(i != 0),
            other => Err(wrong_type(column, "Bool", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(wrong_type(column, "Text", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(column: &str, value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(wrong_type(column, "Bytes", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

impl FromValue for VersionToken {
    fn from_value(_column: &str, value: Value) -> Result<Self> {
        VersionToken::from_storage(value)
    }
}

/// A fetched row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Row of `table` with parallel column names and values
    pub fn new(table: impl Into<String>, columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self {
            table: table.into(),
            columns,
            values,
        }
    }

    /// Raw value of `column`
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Typed value of `column`
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self.value(column).ok_or_else(|| Error::UnknownColumn {
            table: self.table.clone(),
            column: column.to_string(),
        })?;
        T::from_value(column, value.clone())
    }
}
