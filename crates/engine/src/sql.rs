//! SQL rendering
//!
//! Turns a [`Statement`] into SQLite text with positional `?` parameters.
//! Identifiers are always double-quoted.
//!
//! ## Filter rendering
//!
//! | Shape | SQL |
//! |-------|-----|
//! | top-level terms / `And` members | joined with `AND` |
//! | single-arm `Or` member | joined to its predecessor with `OR` |
//! | `Or` with 2+ arms | `(a OR b ...)` |
//! | `And` with 2+ members | `(a AND b ...)` |
//! | `col = NULL` / `col <> NULL` | `IS NULL` / `IS NOT NULL` |

use occrow_core::{
    CmpOp, Column, ColumnDef, Error, Expr, Model, Result, SqlType, Statement, StatementKind,
    TableRef, Value,
};

/// Rendered SQL and its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// SQL text
    pub sql: String,
    /// Positional parameters
    pub params: Vec<Value>,
}

/// Quote an identifier
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Render `stmt` and record the SQL body on it
pub fn render(stmt: &mut Statement) -> Result<Rendered> {
    let rendered = match stmt.kind() {
        StatementKind::Insert => render_insert(stmt),
        StatementKind::Update => render_update(stmt)?,
    };
    stmt.finalize(rendered.sql.clone());
    Ok(rendered)
}

fn render_insert(stmt: &Statement) -> Rendered {
    // NULLs are left to the column default unless set on purpose
    let written: Vec<_> = stmt
        .assignments()
        .into_iter()
        .flat_map(|set| set.iter())
        .filter(|a| !a.value.is_null() || stmt.is_explicit(&a.column))
        .collect();

    let table = quote(stmt.table());
    if written.is_empty() {
        return Rendered {
            sql: format!("INSERT INTO {} DEFAULT VALUES", table),
            params: Vec::new(),
        };
    }

    let columns: Vec<String> = written.iter().map(|a| quote(&a.column)).collect();
    let marks = vec!["?"; written.len()].join(", ");
    Rendered {
        sql: format!("INSERT INTO {} ({}) VALUES ({})", table, columns.join(", "), marks),
        params: written.iter().map(|a| a.value.clone()).collect(),
    }
}

fn render_update(stmt: &Statement) -> Result<Rendered> {
    let table = stmt.table();
    let assignments = stmt
        .assignments()
        .filter(|set| !set.is_empty())
        .ok_or_else(|| Error::EmptyUpdate(table.to_string()))?;
    let filter = stmt
        .filter()
        .filter(|w| !w.is_empty())
        .ok_or_else(|| Error::MissingFilter(table.to_string()))?;

    let mut params = Vec::new();
    let sets: Vec<String> = assignments
        .iter()
        .map(|a| {
            params.push(a.value.clone());
            format!("{} = ?", quote(&a.column))
        })
        .collect();

    let mut sql = format!("UPDATE {} SET {} WHERE ", quote(table), sets.join(", "));
    render_terms(&filter.terms, table, &mut sql, &mut params);
    Ok(Rendered { sql, params })
}

fn render_terms(terms: &[Expr], table: &str, out: &mut String, params: &mut Vec<Value>) {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            out.push_str(if term.is_or_chain() { " OR " } else { " AND " });
        }
        render_expr(term, table, out, params);
    }
}

fn render_expr(expr: &Expr, table: &str, out: &mut String, params: &mut Vec<Value>) {
    match expr {
        Expr::Cmp { column, op, value } => {
            out.push_str(&column_ref(column, table));
            match (op, value) {
                (CmpOp::Eq, Value::Null) => out.push_str(" IS NULL"),
                (CmpOp::Ne, Value::Null) => out.push_str(" IS NOT NULL"),
                _ => {
                    out.push(' ');
                    out.push_str(op.as_sql());
                    out.push_str(" ?");
                    params.push(value.clone());
                }
            }
        }
        Expr::IsNull(column) => {
            out.push_str(&column_ref(column, table));
            out.push_str(" IS NULL");
        }
        Expr::And(members) => match members.as_slice() {
            [] => out.push_str("1 = 1"),
            [only] => render_expr(only, table, out, params),
            _ => {
                out.push('(');
                render_terms(members, table, out, params);
                out.push(')');
            }
        },
        Expr::Or(arms) => match arms.as_slice() {
            [] => out.push_str("1 = 0"),
            [only] => render_expr(only, table, out, params),
            _ => {
                out.push('(');
                for (i, arm) in arms.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" OR ");
                    }
                    render_expr(arm, table, out, params);
                }
                out.push(')');
            }
        },
    }
}

fn column_ref(column: &Column, table: &str) -> String {
    match &column.table {
        None => quote(&column.name),
        Some(TableRef::Current) => format!("{}.{}", quote(table), quote(&column.name)),
        Some(TableRef::Named(other)) => format!("{}.{}", quote(other), quote(&column.name)),
    }
}

fn type_name(sql_type: SqlType) -> &'static str {
    match sql_type {
        SqlType::Integer => "INTEGER",
        SqlType::Real => "REAL",
        SqlType::Text | SqlType::Uuid => "TEXT",
        SqlType::Blob => "BLOB",
        SqlType::Boolean => "BOOLEAN",
    }
}

fn column_sql(def: &ColumnDef) -> String {
    let mut sql = format!("{} {}", quote(def.name), type_name(def.sql_type));
    if def.primary_key {
        sql.push_str(" PRIMARY KEY");
    }
    if !def.nullable {
        sql.push_str(" NOT NULL");
    }
    sql
}

/// `CREATE TABLE IF NOT EXISTS` for `R`
pub fn create_table<R: Model>() -> String {
    let columns: Vec<String> = R::columns().iter().map(column_sql).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(R::TABLE),
        columns.join(", ")
    )
}

/// `SELECT` of every column of `R`, optionally by primary key
pub fn select<R: Model>(by_primary_key: bool) -> String {
    let columns: Vec<String> = R::columns().iter().map(|c| quote(c.name)).collect();
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), quote(R::TABLE));
    if by_primary_key {
        sql.push_str(&format!(" WHERE {} = ? LIMIT 1", quote(R::PRIMARY_KEY)));
    } else {
        sql.push_str(&format!(" ORDER BY {}", quote(R::PRIMARY_KEY)));
    }
    sql
}
