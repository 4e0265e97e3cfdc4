//! Insert Tests
//!
//! Version stamping when records are created.

use crate::*;
use std::collections::HashSet;

#[test]
fn test_insert_assigns_version() {
    let t = TestDb::new();
    let account = t.seed(Account::new(1, "ann"));

    let version = account.version.as_str().expect("version stamped");
    assert!(!version.is_empty());
    assert_eq!(t.stored(1).version, account.version);
}

#[test]
fn test_insert_keeps_preseeded_version() {
    let t = TestDb::new();
    let mut account = Account::new(1, "ann");
    account.version = VersionToken::new();
    let seeded = account.version.clone();

    let account = t.seed(account);
    assert_eq!(account.version, seeded);
    assert_eq!(t.stored(1).version, seeded);
}

#[test]
fn test_versions_unique_across_inserts() {
    let t = TestDb::new();
    let versions: HashSet<String> = (1..=200)
        .map(|id| t.seed(Account::new(id, "x")).version.to_string())
        .collect();
    assert_eq!(versions.len(), 200);
}

#[test]
fn test_time_ordered_strategy_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ordered.db");
    let toml = format!(
        "path = {:?}\nversion_strategy = \"time_ordered\"\nbusy_timeout_ms = 1000\n",
        path.to_string_lossy()
    );
    let config = Config::from_toml_str(&toml).unwrap();
    assert_eq!(config.version_strategy, VersionStrategy::TimeOrdered);

    let db = Database::from_config(config).unwrap();
    db.migrate::<Account>().unwrap();
    let mut account = Account::new(1, "ann");
    db.create(&mut account).unwrap();

    let version = account.version.as_str().unwrap();
    assert_eq!(version.len(), 36);
    assert_eq!(version.as_bytes()[14], b'7', "UUIDv7 expected, got {}", version);
}

#[test]
fn test_existing_row_without_version_reads_as_absent() {
    let t = TestDb::new();
    t.db.execute_raw(
        "INSERT INTO accounts (id, name, balance, frozen) VALUES (?, ?, ?, ?)",
        &[Value::Int(5), Value::from("legacy"), Value::Int(0), Value::Bool(false)],
    )
    .unwrap();

    let account = t.stored(5);
    assert!(!account.version.is_present());
}

#[test]
fn test_failed_insert_leaves_version_absent() {
    let t = TestDb::new();
    let stored = t.seed(Account::new(1, "ann"));

    let mut dup = Account::new(1, "dup");
    let err = t.db.create(&mut dup).unwrap_err();
    assert!(matches!(err, Error::Storage(_)), "got {:?}", err);
    assert!(!dup.version.is_present());
    assert_eq!(t.stored(1).version, stored.version);

    // A retry under a free key gets a fresh version, not a leftover one
    dup.id = 2;
    t.db.create(&mut dup).unwrap();
    assert!(dup.version.is_present());
    assert_ne!(dup.version, stored.version);
    assert_eq!(t.stored(2).version, dup.version);
}

#[test]
fn test_empty_stored_version_is_rejected_on_read() {
    let t = TestDb::new();
    t.db.execute_raw(
        "INSERT INTO accounts (id, name, balance, frozen, version) VALUES (?, ?, ?, ?, ?)",
        &[
            Value::Int(9),
            Value::from("blank"),
            Value::Int(0),
            Value::Bool(false),
            Value::from(""),
        ],
    )
    .unwrap();

    assert!(matches!(
        t.db.first::<Account>(9),
        Err(Error::InvalidVersion(_))
    ));
    assert!(matches!(
        t.db.find_all::<Account>(),
        Err(Error::InvalidVersion(_))
    ));
}
