//! Core library surface for the personal library manager.
//!
//! The record logic (`library`), persistence (`storage`) and the composed
//! store (`store`) are usable without the terminal front-end; `ui` wires them
//! into the interactive menu.
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod storage;
pub mod store;
pub mod ui;

pub use config::Config;
pub use error::{StorageError, StorageResult};
pub use library::{
    AddOutcome, Library, RemoveOutcome, SearchField, SearchResults, SortKey, Statistics,
};
pub use models::{title_case, Book};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use store::BookStore;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
