//! Version stamping for INSERT and UPDATE statements
//!
//! [`VersionInterceptor`] is a [`StatementHook`] installed for every model
//! that declares a version field.
//!
//! ## Insert
//!
//! A record without a version gets a fresh one, written both into the
//! statement's assignments and into the record. A record that already
//! carries a version keeps it. Finalized statements are left alone.
//!
//! ## Update
//!
//! ```text
//! untouched ──► normalized ──► predicate-added ──► version-assigned ──► completed
//! ```
//!
//! 1. Group the existing filter if an OR-chain term would otherwise swallow
//!    the version predicate (see [`normalize_filter`]).
//! 2. If the record has a version, conjoin `<table>.version = <current>`.
//! 3. Assign a fresh version and write it into the record.
//! 4. Mark the statement so repeated invocations are no-ops.

use occrow_core::{
    CmpOp, Column, Expr, RandomUuid, Result, Statement, StatementHook, VersionField,
    VersionGenerator, VersionToken, Where,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Statement marker set once the update phase has run
pub const VERSION_UPDATE_PHASE: &str = "occ.version_update";

/// Make `filter` safe to extend with a conjunctive term.
///
/// A single-arm `Or` term joins its predecessor with OR, so appending
/// `AND version = ?` after it would bind to that arm alone. When such a term
/// exists alongside others, every term is moved into one `And` group, which
/// renders parenthesized and keeps the original meaning.
///
/// Returns whether the filter was rewritten. A filter without that shape is
/// not touched, and a rewritten filter never matches again.
pub fn normalize_filter(filter: &mut Where) -> bool {
    if filter.terms.len() > 1 && filter.terms.iter().any(Expr::is_or_chain) {
        let terms = std::mem::take(&mut filter.terms);
        filter.terms.push(Expr::And(terms));
        return true;
    }
    false
}

/// Optimistic-concurrency hook for one model type
pub struct VersionInterceptor<R> {
    field: VersionField<R>,
    generator: Arc<dyn VersionGenerator>,
}

impl<R> VersionInterceptor<R> {
    /// Interceptor generating random UUID versions
    pub fn new(field: VersionField<R>) -> Self {
        Self::with_generator(field, Arc::new(RandomUuid))
    }

    /// Interceptor generating versions with `generator`
    pub fn with_generator(field: VersionField<R>, generator: Arc<dyn VersionGenerator>) -> Self {
        Self { field, generator }
    }

    /// Version column this interceptor maintains
    pub fn column(&self) -> &'static str {
        self.field.column()
    }

    fn assign_next(&self, stmt: &mut Statement, record: &mut R) -> VersionToken {
        let next = VersionToken::generate(self.generator.as_ref());
        stmt.set_column(self.field.column(), next.to_storage());
        self.field.set(record, next.clone());
        next
    }
}

impl<R> StatementHook<R> for VersionInterceptor<R> {
    fn before_insert(&self, stmt: &mut Statement, record: &mut R) -> Result<()> {
        if stmt.is_finalized() {
            trace!(table = stmt.table(), "statement already rendered, skipping version stamp");
            return Ok(());
        }
        if !self.field.is_unset(record) {
            trace!(
                table = stmt.table(),
                version = %self.field.get(record),
                "keeping caller-supplied version"
            );
            return Ok(());
        }

        let next = self.assign_next(stmt, record);
        debug!(table = stmt.table(), version = %next, "stamped initial version");
        Ok(())
    }

    fn before_update(&self, stmt: &mut Statement, record: &mut R) -> Result<()> {
        if stmt.has_marker(VERSION_UPDATE_PHASE) {
            trace!(table = stmt.table(), "version phase already applied");
            return Ok(());
        }

        if let Some(filter) = stmt.filter_mut() {
            if normalize_filter(filter) {
                debug!("grouped OR-chained filter before adding version predicate");
            }
        }

        let expected = self.field.get(record).to_storage();
        if !expected.is_null() {
            stmt.add_filter(Expr::cmp(
                Column::current(self.field.column()),
                CmpOp::Eq,
                expected,
            ));
        }

        let next = self.assign_next(stmt, record);
        stmt.set_marker(VERSION_UPDATE_PHASE);
        debug!(table = stmt.table(), version = %next, "assigned next version");
        Ok(())
    }
}
