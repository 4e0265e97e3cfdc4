//! Multi-Writer Tests
//!
//! Several writers holding the same version race to update one row.

use crate::*;
use std::sync::{Arc, Barrier};
use std::thread;

const WRITERS: usize = 8;

#[test]
fn test_two_connections_one_row() {
    let t = TestDb::new();
    let other = t.connect();
    t.seed(Account::new(1, "A"));

    let mut mine = t.stored(1);
    let mut theirs = other.first::<Account>(1).unwrap().unwrap();

    other
        .model(&mut theirs)
        .concurrent_update("name", "theirs")
        .into_result()
        .unwrap();

    let outcome = t.db.model(&mut mine).concurrent_update("name", "mine");
    assert!(outcome.is_conflict());
    assert_eq!(t.stored(1).name, "theirs");
    assert_eq!(t.stored(1).version, theirs.version);
}

#[test]
fn test_racing_threads_one_winner() {
    let t = TestDb::new();
    t.seed(Account::new(1, "A"));
    let db = Arc::new(t.connect());
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut copy = db.first::<Account>(1).unwrap().unwrap();
                barrier.wait();
                let name = format!("writer-{}", i);
                let outcome = db.model(&mut copy).concurrent_update("name", name.as_str());
                (name, outcome.is_conflict())
            })
        })
        .collect();

    let results: Vec<(String, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<&String> = results
        .iter()
        .filter(|(_, conflict)| !conflict)
        .map(|(name, _)| name)
        .collect();

    assert_eq!(winners.len(), 1);
    assert_eq!(&t.stored(1).name, winners[0]);
}

#[test]
fn test_racing_connections_one_winner() {
    let t = TestDb::new();
    t.seed(Account::new(1, "A"));
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let db = t.connect();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut copy = db.first::<Account>(1).unwrap().unwrap();
                barrier.wait();
                db.model(&mut copy)
                    .concurrent_update_column("balance", Value::Int(1))
                    .is_conflict()
            })
        })
        .collect();

    let conflicts = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|conflict| *conflict)
        .count();
    assert_eq!(conflicts, WRITERS - 1);
}

#[test]
fn test_retrying_writers_lose_no_increments() {
    let t = TestDb::new();
    t.seed(Account::new(1, "A"));
    let db = Arc::new(t.connect());
    let per_writer = 10;

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for _ in 0..per_writer {
                    loop {
                        let mut copy = db.first::<Account>(1).unwrap().unwrap();
                        let next = copy.balance + 1;
                        let outcome = db.model(&mut copy).concurrent_update("balance", next);
                        if !outcome.is_conflict() {
                            outcome.into_result().unwrap();
                            break;
                        }
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(t.stored(1).balance, (WRITERS * per_writer) as i64);
}
