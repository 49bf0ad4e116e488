//! In-memory half of the record store. Every operation here works on the
//! authoritative `Vec<Book>` without touching storage; `store::BookStore`
//! decides when a mutation gets flushed.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::models::{title_case, Book};

/// Result of an add request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// Result of a remove request. The removed record is handed back so the
/// caller can mention it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Book),
    NotFound,
}

/// Field targeted by the primary search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
}

impl SearchField {
    /// Map a menu answer to a field. Returns `None` for anything the menu
    /// does not offer so the caller can report an invalid choice.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().to_lowercase().as_str() {
            "1" | "title" => Some(Self::Title),
            "2" | "author" => Some(Self::Author),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
        }
    }

    fn value(self, book: &Book) -> &str {
        match self {
            Self::Title => &book.title,
            Self::Author => &book.author,
        }
    }
}

/// Presentation order for the full listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    Author,
    Year,
}

impl SortKey {
    /// Parse a free-text answer. Unknown or empty input falls back to
    /// sorting by title.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "author" => Self::Author,
            "year" => Self::Year,
            _ => Self::Title,
        }
    }

    /// Cycle title -> author -> year -> title.
    pub fn next(self) -> Self {
        match self {
            Self::Title => Self::Author,
            Self::Author => Self::Year,
            Self::Year => Self::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
        }
    }
}

/// Output of a search. `suggestions` is only populated when `matches` is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// Keyword after normalization.
    pub keyword: String,
    pub field: SearchField,
    pub matches: Vec<Book>,
    /// Titles of records whose title or author contains the keyword. Not
    /// deduplicated.
    pub suggestions: Vec<String>,
}

/// Aggregates shown on the statistics screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    /// `None` when the collection is empty.
    pub read_percentage: Option<f64>,
    /// `None` when the collection is empty.
    pub most_common_genre: Option<String>,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Genre for display, with "N/A" standing in for an empty collection.
    pub fn genre_label(&self) -> &str {
        self.most_common_genre.as_deref().unwrap_or("N/A")
    }
}

/// The ordered collection of books. Storage order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    books: Vec<Book>,
}

impl Library {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// Records in insertion order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Append a normalized record unless one with the same title and author
    /// already exists.
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        year: i64,
        genre: &str,
        read: bool,
    ) -> AddOutcome {
        let book = Book::new(title, author, year, genre, read);
        if self.books.iter().any(|existing| existing.same_identity(&book)) {
            warn!("rejected duplicate book '{}' by {}", book.title, book.author);
            return AddOutcome::Duplicate;
        }
        info!("added {book}");
        self.books.push(book);
        AddOutcome::Added
    }

    /// Remove the first record whose title matches. Authors are not
    /// compared, so only the earliest of several same-titled books goes.
    pub fn remove(&mut self, title: &str) -> RemoveOutcome {
        let title = title_case(title);
        match self.books.iter().position(|book| book.title == title) {
            Some(index) => {
                let removed = self.books.remove(index);
                info!("removed {removed}");
                RemoveOutcome::Removed(removed)
            }
            None => {
                warn!("no book titled '{title}' to remove");
                RemoveOutcome::NotFound
            }
        }
    }

    /// Substring search on one field, falling back to a cross-field
    /// suggestion pass when nothing matches.
    pub fn search(&self, field: SearchField, keyword: &str) -> SearchResults {
        let keyword = title_case(keyword);
        let matches: Vec<Book> = self
            .books
            .iter()
            .filter(|book| field.value(book).contains(&keyword))
            .cloned()
            .collect();

        let suggestions = if matches.is_empty() {
            self.books
                .iter()
                .filter(|book| book.title.contains(&keyword) || book.author.contains(&keyword))
                .map(|book| book.title.clone())
                .collect()
        } else {
            Vec::new()
        };

        debug!(
            "search {} for '{}': {} matches, {} suggestions",
            field.label(),
            keyword,
            matches.len(),
            suggestions.len()
        );

        SearchResults {
            keyword,
            field,
            matches,
            suggestions,
        }
    }

    /// Every record sorted ascending by `key`. The sort is stable and the
    /// stored order is left alone.
    pub fn list(&self, key: SortKey) -> Vec<&Book> {
        let mut sorted: Vec<&Book> = self.books.iter().collect();
        match key {
            SortKey::Title => sorted.sort_by(|a, b| a.title.cmp(&b.title)),
            SortKey::Author => sorted.sort_by(|a, b| a.author.cmp(&b.author)),
            SortKey::Year => sorted.sort_by_key(|book| book.year),
        }
        sorted
    }

    pub fn statistics(&self) -> Statistics {
        let total = self.books.len();
        let read = self.books.iter().filter(|book| book.read).count();
        let read_percentage = if total == 0 {
            None
        } else {
            Some(read as f64 * 100.0 / total as f64)
        };

        Statistics {
            total,
            read,
            unread: total - read,
            read_percentage,
            most_common_genre: self.most_common_genre(),
        }
    }

    /// Highest-count genre. Ties go to the genre that first appears earliest
    /// in the collection.
    fn most_common_genre(&self) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for book in &self.books {
            let count = counts.entry(book.genre.as_str()).or_insert(0);
            if *count == 0 {
                first_seen.push(&book.genre);
            }
            *count += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for genre in first_seen {
            let count = counts[genre];
            if best.map_or(true, |(_, max)| count > max) {
                best = Some((genre, count));
            }
        }
        best.map(|(genre, _)| genre.to_string())
    }
}
