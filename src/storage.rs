//! Persistence adapters. The collection is always read and written as one
//! document; there are no partial updates.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{StorageError, StorageResult};
use crate::models::Book;

/// Indentation used for the on-disk document.
const INDENT: &[u8] = b"    ";

/// Load and save the full collection.
pub trait Storage {
    /// Read every record. A store that has never been written is empty.
    fn load(&self) -> StorageResult<Vec<Book>>;

    /// Overwrite the stored collection with `books`.
    fn save(&self, books: &[Book]) -> StorageResult<()>;

    /// Short description of where the data lives, for status messages.
    fn describe(&self) -> String;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> StorageResult<Vec<Book>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("no library at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let books: Vec<Book> =
            serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        info!("loaded {} books from {}", books.len(), self.path.display());
        Ok(books)
    }

    /// Write to a sibling temp file, sync it, then rename it over the target
    /// so a crash mid-write never truncates the previous copy.
    fn save(&self, books: &[Book]) -> StorageResult<()> {
        let encoded = encode(books)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| self.write_err(source))?;
            }
        }

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).map_err(|source| self.write_err(source))?;
            file.write_all(&encoded)
                .map_err(|source| self.write_err(source))?;
            file.sync_all().map_err(|source| self.write_err(source))?;
        }
        fs::rename(&temp_path, &self.path).map_err(|source| self.write_err(source))?;

        info!("saved {} books to {}", books.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pretty-print the collection with four-space indentation.
fn encode(books: &[Book]) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    books
        .serialize(&mut serializer)
        .map_err(StorageError::Serialize)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Process-local storage that keeps the last saved collection in memory.
/// Lets the store and UI be exercised without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    books: RefCell<Vec<Book>>,
    saves: Cell<usize>,
    fail_saves: Cell<bool>,
}

impl MemoryStorage {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books: RefCell::new(books),
            saves: Cell::new(0),
            fail_saves: Cell::new(false),
        }
    }

    /// Make every following `save` fail with a write error until cleared.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Snapshot of the last saved collection.
    pub fn saved(&self) -> Vec<Book> {
        self.books.borrow().clone()
    }

    /// Number of times `save` ran.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> StorageResult<Vec<Book>> {
        Ok(self.books.borrow().clone())
    }

    fn save(&self, books: &[Book]) -> StorageResult<()> {
        if self.fail_saves.get() {
            return Err(StorageError::Write {
                path: PathBuf::from(self.describe()),
                source: io::Error::other("disk full"),
            });
        }
        *self.books.borrow_mut() = books.to_vec();
        self.saves.set(self.saves.get() + 1);
        debug!("memory storage now holds {} books", books.len());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn books() -> Vec<Book> {
        vec![
            Book::new("dune", "frank herbert", 1965, "sci-fi", true),
            Book::new("emma", "jane austen", 1815, "romance", false),
        ]
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("library.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_in_order() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("library.json"));
        storage.save(&books()).unwrap();
        assert_eq!(storage.load().unwrap(), books());
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn saved_document_is_indented_with_expected_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        let storage = JsonFileStorage::new(&path);
        storage.save(&books()[..1]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n    {\n        \"Title\": \"Dune\""));
        assert!(raw.contains("\"Author\": \"Frank Herbert\""));
        assert!(raw.contains("\"Year\": 1965"));
        assert!(raw.contains("\"Genre\": \"Sci-Fi\""));
        assert!(raw.contains("\"Read\": true"));
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("library.json"));
        storage.save(&books()).unwrap();
        storage.save(&[]).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStorage::new(&path).load().unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("library.json"));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, r#"[{"Title": "Dune", "Year": "1965"}]"#).unwrap();
        assert!(JsonFileStorage::new(&path).load().unwrap_err().is_malformed());
    }

    #[test]
    fn memory_storage_counts_saves() {
        let storage = MemoryStorage::default();
        storage.save(&books()).unwrap();
        assert_eq!(storage.save_count(), 1);
        assert_eq!(storage.load().unwrap(), books());
    }

    #[test]
    fn failing_memory_storage_keeps_last_save() {
        let storage = MemoryStorage::new(books());
        storage.set_fail_saves(true);
        let err = storage.save(&[]).unwrap_err();
        assert_eq!(err.to_string(), "failed to write memory");
        assert_eq!(storage.save_count(), 0);
        assert_eq!(storage.saved(), books());
    }
}
