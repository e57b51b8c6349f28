//! Index Consistency Tests
//!
//! - Planner index choice is deterministic
//! - Indexed and scanned queries return the same books
//! - Indexes follow updates and deletes

mod common;

use bookdb::catalog::BookQueries;
use bookdb::query::ScanType;
use bookdb::schema::Book;
use common::{indexed_library, library, titles};

#[test]
fn test_ensure_indexes_is_idempotent() {
    let mut queries = library();

    let names = queries.ensure_indexes().unwrap();
    assert_eq!(names, vec!["title_1", "author_1_published_year_1"]);

    let again = queries.ensure_indexes().unwrap();
    assert_eq!(again, names);
    assert_eq!(queries.collection().index_names().len(), 2);
}

#[test]
fn test_title_lookup_uses_title_index() {
    let queries = indexed_library();

    let plan = queries.explain_by_title("Circe");
    assert!(plan.accepted);
    assert_eq!(plan.selected_index.as_deref(), Some("title_1"));
    assert_eq!(
        plan.scan_type.as_deref(),
        Some(ScanType::IndexedEquality.as_str())
    );
}

#[test]
fn test_author_lookup_uses_compound_index() {
    let queries = indexed_library();

    let plan = queries.explain_by_author("Kazuo Ishiguro");
    assert_eq!(plan.selected_index.as_deref(), Some("author_1_published_year_1"));

    let genre_plan = queries.explain_by_genre("Fantasy");
    assert_eq!(genre_plan.selected_index, None);
    assert_eq!(
        genre_plan.scan_type.as_deref(),
        Some(ScanType::CollectionScan.as_str())
    );
}

#[test]
fn test_plan_choice_is_deterministic() {
    let queries = indexed_library();

    let first = serde_json::to_value(queries.explain_by_author("Andy Weir")).unwrap();
    for _ in 0..10 {
        let again = serde_json::to_value(queries.explain_by_author("Andy Weir")).unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_indexed_and_scanned_results_agree() {
    let scanned = library();
    let indexed = indexed_library();

    for author in ["Kazuo Ishiguro", "Andy Weir", "Nobody"] {
        assert_eq!(
            indexed.find_by_author(author).unwrap(),
            scanned.find_by_author(author).unwrap()
        );
    }
}

#[test]
fn test_indexes_follow_delete() {
    let mut queries = indexed_library();
    let before = queries.collection().indexes().entry_count("title_1").unwrap();

    queries.delete_by_title("The Buried Giant").unwrap();

    let after = queries.collection().indexes().entry_count("title_1").unwrap();
    assert_eq!(after, before - 1);
    assert_eq!(
        queries
            .collection()
            .indexes()
            .entry_count("author_1_published_year_1"),
        Some(queries.collection().len())
    );
    assert_eq!(
        titles(&queries.find_by_author("Kazuo Ishiguro").unwrap()),
        vec!["Klara and the Sun", "The Remains of the Day"]
    );
}

#[test]
fn test_indexes_follow_update() {
    let mut queries = indexed_library();
    queries.update_price("Gone Girl", 9.0).unwrap();

    let flynn = queries.find_by_author("Gillian Flynn").unwrap();
    assert_eq!(flynn.len(), 1);
    assert_eq!(flynn[0].price, Some(9.0));
    assert_eq!(
        queries.collection().indexes().entry_count("title_1"),
        Some(queries.collection().len())
    );
}

#[test]
fn test_inserts_after_index_creation_are_indexed() {
    let mut queries = indexed_library();
    let novel = Book::new("Never Let Me Go", "Kazuo Ishiguro").with_published_year(2005);
    queries.insert(&novel).unwrap();

    let ishiguro = queries.find_by_author("Kazuo Ishiguro").unwrap();
    assert_eq!(ishiguro.len(), 4);
    assert_eq!(ishiguro.last().unwrap().title, "Never Let Me Go");

    let empty = BookQueries::new();
    assert!(empty.collection().index_names().is_empty());
}
