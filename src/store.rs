//! The record store: an in-memory `Library` paired with the storage it was
//! loaded from. Mutations that succeed are flushed immediately; rejected
//! ones leave both memory and storage alone. A mutation whose flush fails is
//! rolled back, so memory never holds a record the file does not.

use log::{info, warn};

use crate::error::StorageResult;
use crate::library::{
    AddOutcome, Library, RemoveOutcome, SearchField, SearchResults, SortKey, Statistics,
};
use crate::models::Book;
use crate::storage::Storage;

#[derive(Debug)]
pub struct BookStore<S: Storage> {
    library: Library,
    storage: S,
}

impl<S: Storage> BookStore<S> {
    /// Load the collection once from `storage`.
    pub fn open(storage: S) -> StorageResult<Self> {
        let books = storage.load()?;
        info!("opened library from {} ({} books)", storage.describe(), books.len());
        Ok(Self {
            library: Library::new(books),
            storage,
        })
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn books(&self) -> &[Book] {
        self.library.books()
    }

    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        year: i64,
        genre: &str,
        read: bool,
    ) -> StorageResult<AddOutcome> {
        let snapshot = self.library.clone();
        let outcome = self.library.add(title, author, year, genre, read);
        if outcome == AddOutcome::Added {
            self.flush_or_restore(snapshot)?;
        }
        Ok(outcome)
    }

    pub fn remove(&mut self, title: &str) -> StorageResult<RemoveOutcome> {
        let snapshot = self.library.clone();
        let outcome = self.library.remove(title);
        if matches!(outcome, RemoveOutcome::Removed(_)) {
            self.flush_or_restore(snapshot)?;
        }
        Ok(outcome)
    }

    pub fn search(&self, field: SearchField, keyword: &str) -> SearchResults {
        self.library.search(field, keyword)
    }

    pub fn list(&self, key: SortKey) -> Vec<&Book> {
        self.library.list(key)
    }

    pub fn statistics(&self) -> Statistics {
        self.library.statistics()
    }

    /// Write the whole collection to storage.
    pub fn flush(&self) -> StorageResult<()> {
        self.storage.save(self.library.books())
    }

    fn flush_or_restore(&mut self, snapshot: Library) -> StorageResult<()> {
        if let Err(err) = self.flush() {
            warn!("save failed, reverting last change: {err}");
            self.library = snapshot;
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn add_flushes_only_on_success() {
        let mut store = BookStore::open(MemoryStorage::default()).unwrap();
        assert_eq!(
            store.add("dune", "frank herbert", 1965, "sci-fi", false).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            store.add("Dune", "Frank Herbert", 1965, "Sci-Fi", false).unwrap(),
            AddOutcome::Duplicate
        );
        assert_eq!(store.storage().save_count(), 1);
        assert_eq!(store.storage().saved().len(), 1);
    }

    #[test]
    fn remove_flushes_only_on_success() {
        let seed = vec![Book::new("emma", "jane austen", 1815, "romance", true)];
        let mut store = BookStore::open(MemoryStorage::new(seed)).unwrap();

        assert_eq!(store.remove("dune").unwrap(), RemoveOutcome::NotFound);
        assert_eq!(store.storage().save_count(), 0);

        assert!(matches!(store.remove("emma").unwrap(), RemoveOutcome::Removed(_)));
        assert_eq!(store.storage().save_count(), 1);
        assert!(store.storage().saved().is_empty());
    }

    #[test]
    fn failed_add_is_rolled_back() {
        let storage = MemoryStorage::default();
        storage.set_fail_saves(true);
        let mut store = BookStore::open(storage).unwrap();

        let err = store
            .add("dune", "frank herbert", 1965, "sci-fi", false)
            .unwrap_err();
        assert!(err.to_string().contains("failed to write"));
        assert!(store.books().is_empty());

        store.storage().set_fail_saves(false);
        assert_eq!(
            store.add("dune", "frank herbert", 1965, "sci-fi", false).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(store.storage().saved().len(), 1);
    }

    #[test]
    fn failed_remove_is_rolled_back() {
        let seed = vec![
            Book::new("foo", "alice", 2000, "drama", false),
            Book::new("foo", "bob", 2001, "drama", false),
        ];
        let mut store = BookStore::open(MemoryStorage::new(seed.clone())).unwrap();
        store.storage().set_fail_saves(true);

        assert!(store.remove("foo").is_err());
        assert_eq!(store.books(), seed.as_slice());
        assert_eq!(store.storage().save_count(), 0);
    }

    #[test]
    fn queries_do_not_flush() {
        let seed = vec![Book::new("emma", "jane austen", 1815, "romance", true)];
        let store = BookStore::open(MemoryStorage::new(seed)).unwrap();
        store.search(SearchField::Title, "em");
        store.list(SortKey::Year);
        store.statistics();
        assert_eq!(store.storage().save_count(), 0);
    }
}
