//! Snapshot Integrity Tests
//!
//! - Saved collections reopen with the same books and ids
//! - Corrupted records are never loaded
//! - Stored bodies must be valid books

mod common;

use bookdb::catalog::{BookQueries, CatalogError};
use bookdb::schema::Book;
use bookdb::storage::{read_snapshot, write_snapshot};
use common::{library, titles};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[test]
fn test_round_trip_preserves_books() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");

    let queries = library();
    assert_eq!(queries.save(&path).unwrap(), queries.collection().len());

    let reopened = BookQueries::open(&path).unwrap();
    assert_eq!(reopened.collection().len(), queries.collection().len());
    assert_eq!(
        titles(&reopened.find_by_genre("Fantasy").unwrap()),
        titles(&queries.find_by_genre("Fantasy").unwrap())
    );

    let ids: Vec<u64> = reopened.collection().scan().map(|(id, _)| id).collect();
    let original: Vec<u64> = queries.collection().scan().map(|(id, _)| id).collect();
    assert_eq!(ids, original);
}

/// Deterministic prices in [0, 1000) with full 53-bit mantissas
fn awkward_prices(count: usize) -> Vec<f64> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64 * 1000.0
        })
        .collect()
}

#[test]
fn test_round_trip_preserves_every_price_bit() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");

    let prices = awkward_prices(2000);
    let mut queries = BookQueries::new();
    let books: Vec<Book> = prices
        .iter()
        .enumerate()
        .map(|(i, price)| Book::new(format!("Volume {}", i), "Anonymous").with_price(*price))
        .collect();
    queries.insert_many(books.iter()).unwrap();
    queries.save(&path).unwrap();

    let reopened = BookQueries::open(&path).unwrap();
    let reloaded: Vec<f64> = reopened
        .find_by_author("Anonymous")
        .unwrap()
        .iter()
        .map(|b| b.price.unwrap())
        .collect();
    assert_eq!(reloaded.len(), prices.len());
    for (saved, loaded) in prices.iter().zip(&reloaded) {
        assert_eq!(saved.to_bits(), loaded.to_bits(), "price {} changed on reload", saved);
    }

    // A second save of the reloaded collection is byte-identical
    let again = dir.path().join("again.jsonl");
    reopened.save(&again).unwrap();
    assert_eq!(fs::read(&path).unwrap(), fs::read(&again).unwrap());
}

#[test]
fn test_missing_snapshot_opens_empty() {
    let dir = create_temp_dir();
    let queries = BookQueries::open(&dir.path().join("absent.jsonl")).unwrap();
    assert!(queries.collection().is_empty());
}

#[test]
fn test_deleted_ids_are_not_reused_after_reopen() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");

    let mut queries = library();
    queries.delete_by_title("Project Hail Mary").unwrap();
    queries.save(&path).unwrap();

    let mut reopened = BookQueries::open(&path).unwrap();
    let max_before = reopened.collection().scan().map(|(id, _)| id).max().unwrap();
    let id = reopened
        .insert(&Book::new("Artemis", "Andy Weir"))
        .unwrap();
    assert!(id > max_before);
}

#[test]
fn test_corrupted_body_is_detected() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");
    library().save(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    fs::write(&path, contents.replacen("Dracula", "Dracule", 1)).unwrap();

    let err = BookQueries::open(&path).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.code(), "BOOKDB_DATA_CORRUPTION");
    match err {
        CatalogError::Storage(e) => assert_eq!(e.line(), Some(4)),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_truncated_line_is_detected() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");
    library().save(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let cut = contents.len() - 20;
    fs::write(&path, &contents[..cut]).unwrap();

    let err = BookQueries::open(&path).unwrap_err();
    assert_eq!(err.code(), "BOOKDB_DATA_CORRUPTION");
}

#[test]
fn test_valid_checksum_invalid_book_is_rejected() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");

    let body = json!({"title": "Untitled", "price": 3.0});
    write_snapshot(&path, [(1u64, &body)]).unwrap();
    assert_eq!(read_snapshot(&path).unwrap().len(), 1);

    let err = BookQueries::open(&path).unwrap_err();
    assert_eq!(err.code(), "BOOKDB_SCHEMA_VALIDATION_FAILED");
}

#[test]
fn test_failed_save_leaves_previous_snapshot() {
    let dir = create_temp_dir();
    let path = dir.path().join("books.jsonl");
    library().save(&path).unwrap();
    let original = fs::read_to_string(&path).unwrap();

    let blocked = dir.path().join("missing_dir").join("books.jsonl");
    assert!(library().save(&blocked).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}
