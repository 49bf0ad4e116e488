//! End-to-end checks of the record store against a real library file.

use std::fs;

use library_manager::{
    AddOutcome, Book, BookStore, JsonFileStorage, RemoveOutcome, SearchField, SortKey,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open(dir: &TempDir) -> BookStore<JsonFileStorage> {
    BookStore::open(JsonFileStorage::new(dir.path().join("library.json"))).unwrap()
}

#[test]
fn fresh_store_starts_empty_without_creating_a_file() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    assert!(store.books().is_empty());
    assert!(!dir.path().join("library.json").exists());
}

#[test]
fn mutations_survive_reopening() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        assert_eq!(
            store.add("dune", "frank herbert", 1965, "sci-fi", true).unwrap(),
            AddOutcome::Added
        );
        store.add("emma", "jane austen", 1815, "romance", false).unwrap();
        store.add("foo", "alice", 2000, "drama", false).unwrap();
        assert!(matches!(store.remove("foo").unwrap(), RemoveOutcome::Removed(_)));
    }

    let store = open(&dir);
    assert_eq!(
        store.books(),
        &[
            Book::new("Dune", "Frank Herbert", 1965, "Sci-Fi", true),
            Book::new("Emma", "Jane Austen", 1815, "Romance", false),
        ]
    );
}

#[test]
fn duplicate_add_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    let mut store = open(&dir);
    store.add("dune", "frank herbert", 1965, "sci-fi", false).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    assert_eq!(
        store.add("Dune", "Frank Herbert", 1999, "Other", true).unwrap(),
        AddOutcome::Duplicate
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.books().len(), 1);
}

#[test]
fn queries_over_loaded_data() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("library.json"),
        r#"[
    {"Title": "Neuromancer", "Author": "William Gibson", "Year": 1984, "Genre": "Sci-Fi", "Read": true},
    {"Title": "Dune", "Author": "Frank Herbert", "Year": 1965, "Genre": "Sci-Fi", "Read": false},
    {"Title": "Emma", "Author": "Jane Austen", "Year": 1815, "Genre": "Romance", "Read": true}
]"#,
    )
    .unwrap();

    let store = open(&dir);
    let titles: Vec<&str> = store
        .list(SortKey::Year)
        .iter()
        .map(|book| book.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Emma", "Dune", "Neuromancer"]);

    let results = store.search(SearchField::Author, "frank");
    assert_eq!(results.matches.len(), 1);
    assert_eq!(results.matches[0].title, "Dune");

    let stats = store.statistics();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.read, 2);
    assert_eq!(stats.genre_label(), "Sci-Fi");
}

#[test]
fn malformed_file_fails_to_open_and_is_kept() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.json");
    fs::write(&path, "[{\"Title\": \"Dune\"}]").unwrap();

    let err = BookStore::open(JsonFileStorage::new(&path)).unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"Title\": \"Dune\"}]");
}
