//! In-flight statements
//!
//! A [`Statement`] is the host's INSERT or UPDATE while it is being built:
//! an ordered assignment set, a filter, and per-statement bookkeeping that
//! hooks use (explicitly-set columns, phase markers). Once the host renders
//! it, the SQL body is recorded with [`Statement::finalize`] and hooks must
//! leave it alone.
//!
//! ## Filter shape
//!
//! [`Where`] holds top-level terms that are conjoined. A term that is an
//! [`Expr::Or`] with exactly one arm is the chaining form produced by
//! `or_where`: it joins its predecessor with OR instead of AND. The same
//! rule applies to members of an [`Expr::And`] group. A disjunction with two
//! or more arms always renders as its own parenthesized group.

use crate::value::Value;
use std::collections::BTreeSet;

/// Table qualifier of a column reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    /// The statement's primary table
    Current,
    /// A named (e.g. joined) table
    Named(String),
}

/// Column reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Qualifying table, if any
    pub table: Option<TableRef>,
    /// Column name
    pub name: String,
}

impl Column {
    /// Unqualified column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Column scoped to the statement's primary table
    pub fn current(name: impl Into<String>) -> Self {
        Self {
            table: Some(TableRef::Current),
            name: name.into(),
        }
    }

    /// Column scoped to a named table
    pub fn of(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(TableRef::Named(table.into())),
            name: name.into(),
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CmpOp {
    /// SQL spelling
    pub fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column <op> value`
    Cmp {
        /// Left-hand column
        column: Column,
        /// Operator
        op: CmpOp,
        /// Bound value
        value: Value,
    },
    /// `column IS NULL`
    IsNull(Column),
    /// Conjunction group
    And(Vec<Expr>),
    /// Disjunction; a single arm is the OR-chaining form
    Or(Vec<Expr>),
}

impl Expr {
    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(Column::new(column), CmpOp::Eq, value)
    }

    /// `column <op> value` on an explicit column reference
    pub fn cmp(column: Column, op: CmpOp, value: impl Into<Value>) -> Self {
        Expr::Cmp {
            column,
            op,
            value: value.into(),
        }
    }

    /// Whether this is the single-arm OR-chaining form
    pub fn is_or_chain(&self) -> bool {
        matches!(self, Expr::Or(arms) if arms.len() == 1)
    }
}

/// Conjoined top-level filter terms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    /// Terms in declaration order
    pub terms: Vec<Expr>,
}

impl Where {
    /// Filter with the given terms
    pub fn new(terms: Vec<Expr>) -> Self {
        Self { terms }
    }

    /// True when there are no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// One `column = value` write
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Target column
    pub column: String,
    /// Value to write
    pub value: Value,
}

/// Ordered assignment set; one entry per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments(Vec<Assignment>);

impl Assignments {
    /// Empty set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Assign `column`, replacing any earlier value for the same column
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|a| a.column == column) {
            Some(existing) => existing.value = value,
            None => self.0.push(Assignment { column, value }),
        }
    }

    /// Value assigned to `column`, if any
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|a| a.column == column).map(|a| &a.value)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.0.iter()
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is assigned
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Statement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// INSERT
    Insert,
    /// UPDATE
    Update,
}

/// A statement under construction
#[derive(Debug, Clone)]
pub struct Statement {
    kind: StatementKind,
    table: String,
    assignments: Option<Assignments>,
    filter: Option<Where>,
    explicit: BTreeSet<String>,
    markers: BTreeSet<&'static str>,
    sql: Option<String>,
}

impl Statement {
    /// New INSERT into `table`
    pub fn insert(table: impl Into<String>) -> Self {
        Self::new(StatementKind::Insert, table)
    }

    /// New UPDATE of `table`
    pub fn update(table: impl Into<String>) -> Self {
        Self::new(StatementKind::Update, table)
    }

    fn new(kind: StatementKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            assignments: None,
            filter: None,
            explicit: BTreeSet::new(),
            markers: BTreeSet::new(),
            sql: None,
        }
    }

    /// Statement kind
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Primary table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Assignment set, if one has been created
    pub fn assignments(&self) -> Option<&Assignments> {
        self.assignments.as_ref()
    }

    /// Assignment set, created on first use
    pub fn assignments_mut(&mut self) -> &mut Assignments {
        self.assignments.get_or_insert_with(Assignments::new)
    }

    /// Current filter, if any
    pub fn filter(&self) -> Option<&Where> {
        self.filter.as_ref()
    }

    /// Mutable filter, if any
    pub fn filter_mut(&mut self) -> Option<&mut Where> {
        self.filter.as_mut()
    }

    /// Replace the whole filter
    pub fn replace_filter(&mut self, filter: Where) {
        self.filter = Some(filter);
    }

    /// Append a conjunctive term, creating the filter if needed
    pub fn add_filter(&mut self, expr: Expr) {
        self.filter.get_or_insert_with(Where::default).terms.push(expr);
    }

    /// Assign `column` and record that it was set on purpose, so the
    /// renderer keeps it even when the value is NULL
    pub fn set_column(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        self.assignments_mut().set(column.clone(), value);
        self.explicit.insert(column);
    }

    /// Whether `column` was explicitly set
    pub fn is_explicit(&self, column: &str) -> bool {
        self.explicit.contains(column)
    }

    /// Whether phase `key` has already run on this statement
    pub fn has_marker(&self, key: &str) -> bool {
        self.markers.contains(key)
    }

    /// Record that phase `key` has run
    pub fn set_marker(&mut self, key: &'static str) {
        self.markers.insert(key);
    }

    /// Record the rendered SQL body
    pub fn finalize(&mut self, sql: impl Into<String>) {
        self.sql = Some(sql.into());
    }

    /// Rendered SQL body, if finalized
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Whether the SQL body has been produced
    pub fn is_finalized(&self) -> bool {
        self.sql.as_deref().map_or(false, |s| !s.is_empty())
    }
}
