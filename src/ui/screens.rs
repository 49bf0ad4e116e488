use crate::library::{SearchResults, SortKey};
use crate::models::Book;

/// Entries of the main menu, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    AddBook,
    RemoveBook,
    SearchBook,
    DisplayBooks,
    Statistics,
    Exit,
}

impl MenuChoice {
    pub(crate) const ALL: [MenuChoice; 6] = [
        MenuChoice::AddBook,
        MenuChoice::RemoveBook,
        MenuChoice::SearchBook,
        MenuChoice::DisplayBooks,
        MenuChoice::Statistics,
        MenuChoice::Exit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuChoice::AddBook => "Add a Book",
            MenuChoice::RemoveBook => "Remove a Book",
            MenuChoice::SearchBook => "Search for a Book",
            MenuChoice::DisplayBooks => "Display All Books",
            MenuChoice::Statistics => "Display Statistics",
            MenuChoice::Exit => "Exit",
        }
    }

    /// Map the digit typed at the menu to a choice.
    pub(crate) fn from_digit(ch: char) -> Option<Self> {
        let index = ch.to_digit(10)? as usize;
        index
            .checked_sub(1)
            .and_then(|idx| MenuChoice::ALL.get(idx))
            .copied()
    }
}

/// Move a cursor within `len` items, clamping at both ends.
pub(crate) fn step_selection(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len as isize - 1;
    (selected as isize + offset).clamp(0, last) as usize
}

/// Snapshot of the collection in presentation order.
pub(crate) struct BookListScreen {
    pub(crate) books: Vec<Book>,
    pub(crate) sort: SortKey,
    pub(crate) selected: usize,
}

impl BookListScreen {
    pub(crate) fn new(books: Vec<Book>, sort: SortKey) -> Self {
        Self {
            books,
            sort,
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.books.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    /// Replace the snapshot after a re-sort, keeping the cursor on the
    /// same book when possible.
    pub(crate) fn set_books(&mut self, books: Vec<Book>, sort: SortKey) {
        let current = self.books.get(self.selected).cloned();
        self.books = books;
        self.sort = sort;
        self.selected = current
            .and_then(|book| self.books.iter().position(|b| *b == book))
            .unwrap_or(0);
    }
}

/// Results of the last search plus the cursor within the match list.
pub(crate) struct SearchScreen {
    pub(crate) results: SearchResults,
    pub(crate) selected: usize,
}

impl SearchScreen {
    pub(crate) fn new(results: SearchResults) -> Self {
        Self {
            results,
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.results.matches.len(), offset);
    }
}
