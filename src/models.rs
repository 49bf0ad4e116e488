//! Domain model for the book collection. `Book` mirrors one entry of the
//! backing JSON document and gets passed throughout the store and the TUI.
//! Normalization lives next to the type so every construction path agrees on
//! what a "Dune" or a "Frank Herbert" looks like before comparisons happen.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One record in the collection. The serde names match the keys used in the
/// backing file, and every key is required when reading it back.
pub struct Book {
    /// Title-cased title; together with `author` it identifies a record.
    #[serde(rename = "Title")]
    pub title: String,
    /// Title-cased author name.
    #[serde(rename = "Author")]
    pub author: String,
    /// Publication year. No range validation is applied.
    #[serde(rename = "Year")]
    pub year: i64,
    /// Title-cased genre, used for the statistics breakdown.
    #[serde(rename = "Genre")]
    pub genre: String,
    /// Whether the owner has read the book.
    #[serde(rename = "Read")]
    pub read: bool,
}

impl Book {
    /// Build a record from raw user input, trimming and title-casing the text
    /// fields.
    pub fn new(title: &str, author: &str, year: i64, genre: &str, read: bool) -> Self {
        Self {
            title: title_case(title),
            author: title_case(author),
            year,
            genre: title_case(genre),
            read,
        }
    }

    /// Whether `self` and `other` are the same record for duplicate checks.
    pub fn same_identity(&self, other: &Book) -> bool {
        self.title == other.title && self.author == other.author
    }

    /// Human-readable read flag.
    pub fn status_label(&self) -> &'static str {
        if self.read {
            "Read"
        } else {
            "Unread"
        }
    }

    /// `Title by Author (Year) - Genre`, the part of a listing line that
    /// precedes the read status.
    pub fn summary(&self) -> String {
        format!(
            "{} by {} ({}) - {}",
            self.title, self.author, self.year, self.genre
        )
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.summary(), self.status_label())
    }
}

/// Trim `input` and title-case it: the first letter of every run of letters
/// is upper-cased and the rest lower-cased. Any non-letter (digits, hyphens,
/// apostrophes, spaces) ends a run, so "sci-fi" becomes "Sci-Fi".
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.trim().chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
