//! Update builder bound to one record
//!
//! [`ModelQuery`] scopes an UPDATE to a record's primary key plus any extra
//! conditions, runs the statement hooks the database installed for the
//! model, and executes it. Every entry point returns an [`UpdateOutcome`]
//! instead of a bare `Result`, so wrappers can attach further errors.
//!
//! If the write fails or matches no row, the record's version is put back
//! to what it held before the call; the in-memory record never claims a
//! version that was not stored.

use crate::database::Database;
use crate::sql;
use occrow_core::{
    Changes, CmpOp, Column, Error, Expr, Model, Result, Statement, UpdateExecutor, UpdateOutcome,
    Value,
};
use std::collections::BTreeMap;
use tracing::debug;

/// UPDATE builder for a single record
pub struct ModelQuery<'a, R: Model> {
    db: &'a Database,
    record: &'a mut R,
    conditions: Vec<Expr>,
}

impl<'a, R: Model> ModelQuery<'a, R> {
    pub(crate) fn new(db: &'a Database, record: &'a mut R) -> Self {
        Self {
            db,
            record,
            conditions: Vec::new(),
        }
    }

    /// Add a condition joined with AND
    pub fn where_(mut self, expr: Expr) -> Self {
        self.conditions.push(expr);
        self
    }

    /// Add a condition joined to the previous one with OR
    pub fn or_where(mut self, expr: Expr) -> Self {
        self.conditions.push(Expr::Or(vec![expr]));
        self
    }

    fn run(mut self, changes: Changes, lifecycle: bool) -> UpdateOutcome {
        let field = R::version_field();
        let previous = field.map(|f| f.get(self.record).clone());

        let result = self.execute(changes, lifecycle);

        if !matches!(result, Ok(n) if n > 0) {
            if let (Some(field), Some(previous)) = (field, previous) {
                field.set(self.record, previous);
            }
        }
        match result {
            Ok(rows) => UpdateOutcome::affected(rows),
            Err(e) => UpdateOutcome::failed(e),
        }
    }

    fn execute(&mut self, changes: Changes, lifecycle: bool) -> Result<u64> {
        if lifecycle {
            self.record.before_update()?;
        }

        let mut stmt = Statement::update(R::TABLE);
        match changes {
            Changes::Model => {
                for (column, value) in self.record.values() {
                    if column != R::PRIMARY_KEY && !value.is_null() {
                        stmt.assignments_mut().set(column, value);
                    }
                }
            }
            Changes::Columns(columns) => {
                for (column, value) in columns {
                    check_column::<R>(&column)?;
                    stmt.set_column(column, value);
                }
            }
        }

        stmt.add_filter(Expr::cmp(
            Column::current(R::PRIMARY_KEY),
            CmpOp::Eq,
            self.record.primary_key(),
        ));
        for condition in self.conditions.drain(..) {
            stmt.add_filter(condition);
        }

        for hook in self.db.hooks::<R>() {
            hook.before_update(&mut stmt, self.record)?;
        }

        let rendered = sql::render(&mut stmt)?;
        let rows = self.db.execute(&rendered)?;
        debug!(table = R::TABLE, rows, "update executed");
        Ok(rows)
    }
}

fn check_column<R: Model>(column: &str) -> Result<()> {
    if R::columns().iter().any(|c| c.name == column) {
        Ok(())
    } else {
        Err(Error::UnknownColumn {
            table: R::TABLE.to_string(),
            column: column.to_string(),
        })
    }
}

impl<R: Model> UpdateExecutor for ModelQuery<'_, R> {
    fn table(&self) -> &str {
        R::TABLE
    }

    fn update(self, column: &str, value: Value) -> UpdateOutcome {
        self.run(Changes::column(column, value), true)
    }

    fn updates(self, changes: Changes) -> UpdateOutcome {
        self.run(changes, true)
    }

    fn update_column(self, column: &str, value: Value) -> UpdateOutcome {
        self.run(Changes::column(column, value), false)
    }

    fn update_columns(self, columns: BTreeMap<String, Value>) -> UpdateOutcome {
        self.run(Changes::Columns(columns), false)
    }
}
