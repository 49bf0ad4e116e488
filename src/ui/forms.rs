use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Answer that marks a book as read; anything else means unread.
const AFFIRMATIVE: &str = "yes";

/// Normalize a free-text "have you read it?" answer.
pub(crate) fn parse_read_answer(answer: &str) -> bool {
    answer.trim().to_lowercase() == AFFIRMATIVE
}

/// Typed values collected by the add form, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewBook {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: i64,
    pub(crate) genre: String,
    pub(crate) read: bool,
}

/// Fields available within the add-book form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
}

impl BookField {
    pub(crate) const ALL: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Genre,
        BookField::Read,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Genre => "Genre",
            BookField::Read => "Read (yes/no)",
        }
    }

    fn index(self) -> usize {
        match self {
            BookField::Title => 0,
            BookField::Author => 1,
            BookField::Year => 2,
            BookField::Genre => 3,
            BookField::Read => 4,
        }
    }
}

/// Form state for adding a book.
#[derive(Default, Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    pub(crate) fn focus(&mut self, field: BookField) {
        self.active = field;
    }

    pub(crate) fn next_field(&mut self) {
        let idx = (self.active.index() + 1) % BookField::ALL.len();
        self.active = BookField::ALL[idx];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = BookField::ALL.len();
        let idx = (self.active.index() + len - 1) % len;
        self.active = BookField::ALL[idx];
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Year => &mut self.year,
            BookField::Genre => &mut self.genre,
            BookField::Read => &mut self.read,
        }
    }

    pub(crate) fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Genre => &self.genre,
            BookField::Read => &self.read,
        }
    }

    /// Append a character to the active field. Control characters are
    /// ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate the inputs. A year that does not parse clears the year field
    /// and moves focus back to it so the user can try again.
    pub(crate) fn parse_inputs(&mut self) -> Result<NewBook> {
        let year = match self.year.trim().parse::<i64>() {
            Ok(year) => year,
            Err(_) => {
                self.year.clear();
                self.focus(BookField::Year);
                return Err(anyhow!("Invalid input! Please enter a valid year."));
            }
        };

        Ok(NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            year,
            genre: self.genre.clone(),
            read: parse_read_answer(&self.read),
        })
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        build_field_line(field.label(), self.value(field), self.active == field)
    }

    /// Character count of a field, used to place the cursor.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}

/// Single-line prompt used for removal, the search dialogs and the sort
/// question.
#[derive(Clone, Debug)]
pub(crate) struct PromptForm {
    pub(crate) label: &'static str,
    pub(crate) value: String,
}

impl PromptForm {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        build_field_line(self.label, &self.value, true)
    }

    /// Column where the cursor sits, counting the `label: ` prefix.
    pub(crate) fn cursor_offset(&self) -> usize {
        self.label.chars().count() + 2 + self.value.chars().count()
    }
}

fn build_field_line(name: &str, value: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() && !is_active {
        "<empty>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{name}: ")),
        Span::styled(display, style),
    ])
}
