//! Conflict Tests
//!
//! The `concurrent_*` wrappers over stale, fresh and missing records.

use crate::*;
use std::collections::BTreeMap;

/// Which wrapper to drive
#[derive(Debug, Clone, Copy)]
enum Wrapper {
    Update,
    Updates,
    UpdateColumn,
    UpdateColumns,
}

const ALL: [Wrapper; 4] = [
    Wrapper::Update,
    Wrapper::Updates,
    Wrapper::UpdateColumn,
    Wrapper::UpdateColumns,
];

fn write_name(db: &Database, account: &mut Account, wrapper: Wrapper, name: &str) -> UpdateOutcome {
    let query = db.model(account);
    match wrapper {
        Wrapper::Update => query.concurrent_update("name", name),
        Wrapper::Updates => query.concurrent_updates(Changes::column("name", name)),
        Wrapper::UpdateColumn => query.concurrent_update_column("name", name),
        Wrapper::UpdateColumns => {
            let mut columns = BTreeMap::new();
            columns.insert("name".to_string(), Value::from(name));
            query.concurrent_update_columns(columns)
        }
    }
}

// =============================================================================
// STALE COPIES
// =============================================================================

#[test]
fn test_stale_copy_conflicts_for_every_wrapper() {
    let t = TestDb::new();
    for (i, wrapper) in ALL.into_iter().enumerate() {
        let id = i as i64 + 1;
        let mut fresh = t.seed(Account::new(id, "A"));
        let mut stale = fresh.clone();

        let outcome = write_name(&t.db, &mut fresh, wrapper, "B");
        assert_eq!(outcome.into_result().unwrap(), 1, "{:?}", wrapper);

        let outcome = write_name(&t.db, &mut stale, wrapper, "C");
        assert_eq!(outcome.rows_affected, 0);
        assert!(outcome.is_conflict(), "{:?}", wrapper);
        match outcome.into_result() {
            Err(Error::ConcurrencyConflict { table }) => assert_eq!(table, "accounts"),
            other => panic!("{:?}: expected conflict, got {:?}", wrapper, other),
        }

        let stored = t.stored(id);
        assert_eq!(stored.name, "B");
        assert_eq!(stored.version, fresh.version);
    }
}

#[test]
fn test_fresh_copy_never_conflicts() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "A"));
    for wrapper in ALL {
        let outcome = write_name(&t.db, &mut account, wrapper, "B");
        assert!(!outcome.is_conflict(), "{:?}", wrapper);
        assert_eq!(outcome.into_result().unwrap(), 1);
    }
    assert_eq!(t.stored(1).version, account.version);
}

#[test]
fn test_conflict_leaves_stale_copy_version_untouched() {
    let t = TestDb::new();
    let mut fresh = t.seed(Account::new(1, "A"));
    let mut stale = fresh.clone();
    let old = stale.version.clone();

    write_name(&t.db, &mut fresh, Wrapper::Update, "B")
        .into_result()
        .unwrap();
    let outcome = write_name(&t.db, &mut stale, Wrapper::Update, "C");

    assert!(outcome.is_conflict());
    assert_eq!(stale.version, old);
}

// =============================================================================
// OTHER ZERO-ROW CASES
// =============================================================================

#[test]
fn test_missing_row_reports_conflict() {
    let t = TestDb::new();
    let mut ghost = Account::new(404, "nobody");
    ghost.version = VersionToken::new();

    let outcome = t.db.model(&mut ghost).concurrent_update("name", "x");
    assert!(outcome.is_conflict());
}

#[test]
fn test_host_error_comes_before_conflict() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "A"));

    let outcome = t
        .db
        .model(&mut account)
        .concurrent_update_column("nickname", "x");

    assert_eq!(outcome.errors().len(), 2);
    assert!(matches!(outcome.errors()[0], Error::UnknownColumn { .. }));
    assert!(outcome.errors()[1].is_conflict());
}

#[test]
fn test_lifecycle_rejection_comes_before_conflict() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "A"));
    account.frozen = true;

    let outcome = t.db.model(&mut account).concurrent_update("name", "x");
    assert!(matches!(outcome.error(), Some(Error::Rejected(_))));
    assert!(outcome.is_conflict());
}

// =============================================================================
// CALLER-OWNED RETRY
// =============================================================================

#[test]
fn test_retry_after_reload_succeeds() {
    let t = TestDb::new();
    let mut fresh = t.seed(Account::new(1, "A"));
    let mut stale = fresh.clone();

    fresh.balance = 10;
    t.db.model(&mut fresh)
        .concurrent_updates(Changes::Model)
        .into_result()
        .unwrap();

    let err = t
        .db
        .model(&mut stale)
        .concurrent_update("name", "C")
        .into_result()
        .unwrap_err();
    assert!(err.is_retryable());

    let mut reloaded = t.stored(1);
    t.db.model(&mut reloaded)
        .concurrent_update("name", "C")
        .into_result()
        .unwrap();

    let stored = t.stored(1);
    assert_eq!((stored.name.as_str(), stored.balance), ("C", 10));
}
