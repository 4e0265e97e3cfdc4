//! Update Tests
//!
//! Version rotation and the expected-version predicate on plain updates.

use crate::*;
use std::collections::{BTreeMap, HashSet};

#[test]
fn test_update_rotates_and_persists_version() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "A"));
    let first = account.version.clone();

    let outcome = t.db.model(&mut account).update("name", Value::from("B"));
    assert_eq!(outcome.into_result().unwrap(), 1);

    assert!(account.version.is_present());
    assert_ne!(account.version, first);

    let stored = t.stored(1);
    assert_eq!(stored.name, "B");
    assert_eq!(stored.version, account.version);
}

#[test]
fn test_each_update_gets_a_new_version() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "A"));
    let mut seen = HashSet::new();
    seen.insert(account.version.to_string());

    for balance in 1..=5 {
        t.db.model(&mut account)
            .update_column("balance", Value::Int(balance))
            .into_result()
            .unwrap();
        assert!(seen.insert(account.version.to_string()));
    }
    assert_eq!(t.stored(1).balance, 5);
}

#[test]
fn test_update_without_known_version_still_applies() {
    let t = TestDb::new();
    t.db.execute_raw(
        "INSERT INTO accounts (id, name, balance, frozen) VALUES (?, ?, ?, ?)",
        &[Value::Int(1), Value::from("legacy"), Value::Int(0), Value::Bool(false)],
    )
    .unwrap();

    let mut account = t.stored(1);
    assert!(!account.version.is_present());

    let outcome = t.db.model(&mut account).update("name", Value::from("migrated"));
    assert_eq!(outcome.into_result().unwrap(), 1);
    assert!(account.version.is_present());
    assert_eq!(t.stored(1).version, account.version);
}

#[test]
fn test_update_columns_can_write_null() {
    let t = TestDb::new();
    let mut account = Account::new(1, "ann");
    account.email = Some("ann@example.com".into());
    let mut account = t.seed(account);

    let mut columns = BTreeMap::new();
    columns.insert("email".to_string(), Value::Null);
    columns.insert("balance".to_string(), Value::Int(12));
    let outcome = t.db.model(&mut account).update_columns(columns);
    assert_eq!(outcome.into_result().unwrap(), 1);

    let stored = t.stored(1);
    assert_eq!(stored.email, None);
    assert_eq!(stored.balance, 12);
    assert_eq!(stored.version, account.version);
}

#[test]
fn test_updates_whole_record() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "ann"));

    account.name = "bea".into();
    account.balance = 30;
    let outcome = t.db.model(&mut account).updates(Changes::Model);
    assert_eq!(outcome.into_result().unwrap(), 1);

    assert_eq!(t.stored(1), account);
}

#[test]
fn test_lifecycle_veto_only_for_update_and_updates() {
    let t = TestDb::new();
    let mut account = t.seed(Account::new(1, "ann"));
    let version = account.version.clone();
    account.frozen = true;

    let outcome = t.db.model(&mut account).update("name", Value::from("x"));
    assert!(matches!(outcome.error(), Some(Error::Rejected(_))));
    assert_eq!(account.version, version, "failed update keeps the old version");

    let outcome = t.db.model(&mut account).update_column("name", Value::from("x"));
    assert_eq!(outcome.into_result().unwrap(), 1);
    assert_ne!(account.version, version);
    assert_eq!(t.stored(1).name, "x");
}
