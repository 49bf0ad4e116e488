use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::library::{AddOutcome, RemoveOutcome, SearchField, SortKey, Statistics};
use crate::storage::Storage;
use crate::store::BookStore;

use super::forms::{BookField, BookForm, PromptForm};
use super::helpers::{
    centered_rect, key_hints, numbered_book_line, statistics_lines, surface_error,
};
use super::screens::{BookListScreen, MenuChoice, SearchScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// High-level navigation states.
enum Screen {
    Menu,
    Books(BookListScreen),
    SearchResults(SearchScreen),
    Statistics(Statistics),
}

/// Modal dialogs layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    RemovingBook(PromptForm),
    ChoosingSearchField(PromptForm),
    EnteringKeyword { field: SearchField, form: PromptForm },
    ChoosingSort(PromptForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App<S: Storage> {
    store: BookStore<S>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<S: Storage> App<S> {
    pub fn new(store: BookStore<S>) -> Self {
        Self {
            store,
            selected: 0,
            screen: Screen::Menu,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn store(&self) -> &BookStore<S> {
        &self.store
    }

    /// Feed one key press through the state machine. Returns `true` once the
    /// library has been saved for exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::RemovingBook(form) => self.handle_remove_book(code, form)?,
            Mode::ChoosingSearchField(form) => self.handle_search_field(code, form),
            Mode::EnteringKeyword { field, form } => self.handle_keyword(code, field, form),
            Mode::ChoosingSort(form) => self.handle_sort_prompt(code, form),
        };

        Ok(exit)
    }

    /// Ctrl-C drops any open dialog and exits through the normal save path.
    pub(crate) fn handle_ctrl_c(&mut self) -> Result<bool> {
        self.mode = Mode::Normal;
        let mut exit = false;
        self.mode = self.run_choice(MenuChoice::Exit, &mut exit)?;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Menu => match code {
                KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                    Ok(Mode::Normal)
                }
                KeyCode::Down => {
                    self.selected = (self.selected + 1).min(MenuChoice::ALL.len() - 1);
                    Ok(Mode::Normal)
                }
                KeyCode::Home => {
                    self.selected = 0;
                    Ok(Mode::Normal)
                }
                KeyCode::End => {
                    self.selected = MenuChoice::ALL.len() - 1;
                    Ok(Mode::Normal)
                }
                KeyCode::Enter => {
                    let choice = MenuChoice::ALL[self.selected];
                    self.run_choice(choice, exit)
                }
                KeyCode::Char('q') | KeyCode::Esc => self.run_choice(MenuChoice::Exit, exit),
                KeyCode::Char(ch) => match MenuChoice::from_digit(ch) {
                    Some(choice) => {
                        self.selected = choice_index(choice);
                        self.run_choice(choice, exit)
                    }
                    None => {
                        self.set_status(
                            "Invalid choice! Please enter a number between 1-6.",
                            StatusKind::Error,
                        );
                        Ok(Mode::Normal)
                    }
                },
                _ => Ok(Mode::Normal),
            },
            Screen::Books(ref mut list) => {
                let mut resort = false;
                match code {
                    KeyCode::Char('q') => return self.run_choice(MenuChoice::Exit, exit),
                    KeyCode::Esc | KeyCode::Backspace => {
                        self.back_to_menu();
                        return Ok(Mode::Normal);
                    }
                    KeyCode::Up => list.move_selection(-1),
                    KeyCode::Down => list.move_selection(1),
                    KeyCode::PageUp => list.move_selection(-PAGE_STEP),
                    KeyCode::PageDown => list.move_selection(PAGE_STEP),
                    KeyCode::Home => list.select_first(),
                    KeyCode::End => list.select_last(),
                    KeyCode::Tab => resort = true,
                    _ => {}
                }

                if resort {
                    let key = list.sort.next();
                    let books = self.store.list(key).into_iter().cloned().collect();
                    list.set_books(books, key);
                    self.set_status(format!("Sorted by {}.", key.label()), StatusKind::Info);
                }
                Ok(Mode::Normal)
            }
            Screen::SearchResults(ref mut search) => {
                match code {
                    KeyCode::Char('q') => return self.run_choice(MenuChoice::Exit, exit),
                    KeyCode::Esc | KeyCode::Backspace => self.back_to_menu(),
                    KeyCode::Up => search.move_selection(-1),
                    KeyCode::Down => search.move_selection(1),
                    KeyCode::PageUp => search.move_selection(-PAGE_STEP),
                    KeyCode::PageDown => search.move_selection(PAGE_STEP),
                    KeyCode::Char('f') => {
                        self.clear_status();
                        return Ok(search_field_prompt());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Statistics(_) => {
                match code {
                    KeyCode::Char('q') => return self.run_choice(MenuChoice::Exit, exit),
                    KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter => self.back_to_menu(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn run_choice(&mut self, choice: MenuChoice, exit: &mut bool) -> Result<Mode> {
        self.clear_status();
        match choice {
            MenuChoice::AddBook => Ok(Mode::AddingBook(BookForm::default())),
            MenuChoice::RemoveBook => Ok(Mode::RemovingBook(PromptForm::new("Title to remove"))),
            MenuChoice::SearchBook => Ok(search_field_prompt()),
            MenuChoice::DisplayBooks => {
                if self.store.library().is_empty() {
                    self.set_status("Your library is empty!", StatusKind::Warning);
                    Ok(Mode::Normal)
                } else {
                    Ok(Mode::ChoosingSort(PromptForm::new(
                        "Sort by (title/author/year)",
                    )))
                }
            }
            MenuChoice::Statistics => {
                let stats = self.store.statistics();
                if stats.is_empty() {
                    self.set_status("No books in library!", StatusKind::Warning);
                } else {
                    self.screen = Screen::Statistics(stats);
                }
                Ok(Mode::Normal)
            }
            MenuChoice::Exit => {
                match self.store.flush().context("failed to save library") {
                    Ok(()) => *exit = true,
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let book = match form.parse_inputs() {
                    Ok(book) => book,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                        return Ok(Mode::AddingBook(form));
                    }
                };

                let outcome = self
                    .store
                    .add(&book.title, &book.author, book.year, &book.genre, book.read)
                    .context("failed to save library");
                match outcome {
                    Ok(AddOutcome::Added) => {
                        self.refresh_screen();
                        self.set_status("Book added successfully!", StatusKind::Info);
                    }
                    Ok(AddOutcome::Duplicate) => {
                        self.set_status(
                            "This book already exists in your library.",
                            StatusKind::Warning,
                        );
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                        return Ok(Mode::AddingBook(form));
                    }
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingBook(form))
    }

    fn handle_remove_book(&mut self, code: KeyCode, mut form: PromptForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                form.backspace();
                Ok(Mode::RemovingBook(form))
            }
            KeyCode::Enter => {
                let outcome = self
                    .store
                    .remove(&form.value)
                    .context("failed to save library");
                match outcome {
                    Ok(RemoveOutcome::Removed(_)) => {
                        self.refresh_screen();
                        self.set_status("Book removed successfully!", StatusKind::Info);
                    }
                    Ok(RemoveOutcome::NotFound) => {
                        self.set_status("Book not found!", StatusKind::Warning);
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        return Ok(Mode::RemovingBook(form));
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Ok(Mode::RemovingBook(form))
            }
            _ => Ok(Mode::RemovingBook(form)),
        }
    }

    fn handle_search_field(&mut self, code: KeyCode, mut form: PromptForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::ChoosingSearchField(form)
            }
            KeyCode::Enter => match SearchField::from_choice(&form.value) {
                Some(field) => Mode::EnteringKeyword {
                    field,
                    form: PromptForm::new(keyword_label(field)),
                },
                None => {
                    self.set_status("Invalid choice!", StatusKind::Error);
                    Mode::Normal
                }
            },
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Mode::ChoosingSearchField(form)
            }
            _ => Mode::ChoosingSearchField(form),
        }
    }

    fn handle_keyword(&mut self, code: KeyCode, field: SearchField, mut form: PromptForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let results = self.store.search(field, &form.value);
                if results.matches.is_empty() {
                    self.set_status("No exact matches found.", StatusKind::Warning);
                } else {
                    let count = results.matches.len();
                    let plural = if count == 1 { "" } else { "s" };
                    self.set_status(
                        format!("Found {count} matching book{plural}."),
                        StatusKind::Info,
                    );
                }
                self.screen = Screen::SearchResults(SearchScreen::new(results));
                return Mode::Normal;
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::EnteringKeyword { field, form }
    }

    fn handle_sort_prompt(&mut self, code: KeyCode, mut form: PromptForm) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Backspace => {
                form.backspace();
                Mode::ChoosingSort(form)
            }
            KeyCode::Enter => {
                let key = SortKey::parse(&form.value);
                let books = self.store.list(key).into_iter().cloned().collect();
                self.screen = Screen::Books(BookListScreen::new(books, key));
                Mode::Normal
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Mode::ChoosingSort(form)
            }
            _ => Mode::ChoosingSort(form),
        }
    }

    /// Rebuild whichever snapshot the current screen shows after the
    /// collection changed.
    fn refresh_screen(&mut self) {
        match &mut self.screen {
            Screen::Books(list) => {
                let key = list.sort;
                let books = self.store.list(key).into_iter().cloned().collect();
                list.set_books(books, key);
            }
            Screen::Statistics(stats) => *stats = self.store.statistics(),
            Screen::SearchResults(search) => {
                let field = search.results.field;
                let keyword = search.results.keyword.clone();
                *search = SearchScreen::new(self.store.search(field, &keyword));
            }
            Screen::Menu => {}
        }
    }

    fn back_to_menu(&mut self) {
        self.clear_status();
        self.screen = Screen::Menu;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::Books(list) => self.draw_books(frame, content_area, list),
            Screen::SearchResults(search) => self.draw_search_results(frame, content_area, search),
            Screen::Statistics(stats) => self.draw_statistics(frame, content_area, stats),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::RemovingBook(form) => self.draw_prompt(frame, area, "Remove a Book", form),
            Mode::ChoosingSearchField(form) => {
                self.draw_prompt(frame, area, "Search by: 1. Title  2. Author", form)
            }
            Mode::EnteringKeyword { form, .. } => {
                self.draw_prompt(frame, area, "Search for a Book", form)
            }
            Mode::ChoosingSort(form) => self.draw_prompt(frame, area, "Display All Books", form),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let count = self.store.library().len();
        let plural = if count == 1 { "" } else { "s" };
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                "PERSONAL LIBRARY MANAGER",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{count} book{plural} in {}",
                self.store.storage().describe()
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = MenuChoice::ALL
            .iter()
            .enumerate()
            .map(|(idx, choice)| ListItem::new(format!("{}. {}", idx + 1, choice.label())))
            .collect();
        let menu = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Menu"))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(menu, chunks[1], &mut state);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect, list: &BookListScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Your Library",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  •  {} books  •  sorted by {}",
                list.books.len(),
                list.sort.label()
            )),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        if list.books.is_empty() {
            let message = Paragraph::new("Your library is empty!")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = list
            .books
            .iter()
            .enumerate()
            .map(|(idx, book)| ListItem::new(numbered_book_line(idx + 1, book)))
            .collect();
        self.render_selectable(frame, chunks[1], items, list.selected);
    }

    fn draw_search_results(&self, frame: &mut Frame, area: Rect, search: &SearchScreen) {
        let results = &search.results;
        let title = format!(
            "Search • {} contains '{}'",
            results.field.label(),
            results.keyword
        );

        if !results.matches.is_empty() {
            let items: Vec<ListItem> = results
                .matches
                .iter()
                .enumerate()
                .map(|(idx, book)| ListItem::new(numbered_book_line(idx + 1, book)))
                .collect();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1)])
                .split(area);
            let header = Paragraph::new("Matching Books:")
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(header, chunks[0]);
            self.render_selectable(frame, chunks[1], items, search.selected);
            return;
        }

        let mut lines = vec![Line::from(Span::styled(
            "No exact matches found.",
            Style::default().fg(Color::Yellow),
        ))];
        if !results.suggestions.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from("Did you mean:"));
            lines.extend(
                results
                    .suggestions
                    .iter()
                    .map(|suggestion| Line::from(format!("- {suggestion}"))),
            );
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect, stats: &Statistics) {
        let paragraph = Paragraph::new(statistics_lines(stats))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Library Statistics"),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_selectable(&self, frame: &mut Frame, area: Rect, items: Vec<ListItem>, selected: usize) {
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Yellow));
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) => key_hints(&[
                ("Tab", "Next Field"),
                ("Enter", "Save"),
                ("Esc", "Cancel"),
            ]),
            (_, Mode::Normal) => match self.screen {
                Screen::Menu => key_hints(&[
                    ("1-6", "Choose"),
                    ("↑↓", "Move"),
                    ("Enter", "Open"),
                    ("q", "Save & Quit"),
                ]),
                Screen::Books(_) => key_hints(&[
                    ("↑↓", "Scroll"),
                    ("Tab", "Change Sort"),
                    ("Esc", "Menu"),
                    ("q", "Save & Quit"),
                ]),
                Screen::SearchResults(_) => key_hints(&[
                    ("↑↓", "Scroll"),
                    ("f", "New Search"),
                    ("Esc", "Menu"),
                    ("q", "Save & Quit"),
                ]),
                Screen::Statistics(_) => key_hints(&[("Esc", "Menu"), ("q", "Save & Quit")]),
            },
            _ => key_hints(&[("Enter", "Confirm"), ("Esc", "Cancel")]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add a Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = BookField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = form.active.label().chars().count() + 2;
        let cursor_x = inner.x + (prefix + form.value_len(form.active)) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, title: &str, form: &PromptForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        frame.set_cursor_position((inner.x + form.cursor_offset() as u16, inner.y));
    }
}

fn search_field_prompt() -> Mode {
    Mode::ChoosingSearchField(PromptForm::new("Enter choice (1/2)"))
}

fn keyword_label(field: SearchField) -> &'static str {
    match field {
        SearchField::Title => "Book title",
        SearchField::Author => "Author name",
    }
}

fn choice_index(choice: MenuChoice) -> usize {
    MenuChoice::ALL
        .iter()
        .position(|candidate| *candidate == choice)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::models::Book;
    use crate::storage::MemoryStorage;

    fn app_with(books: Vec<Book>) -> App<MemoryStorage> {
        App::new(BookStore::open(MemoryStorage::new(books)).unwrap())
    }

    fn type_text(app: &mut App<MemoryStorage>, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn press(app: &mut App<MemoryStorage>, code: KeyCode) -> bool {
        app.handle_key(code).unwrap()
    }

    fn fill_add_form(app: &mut App<MemoryStorage>, fields: [&str; 5]) {
        press(app, KeyCode::Char('1'));
        for (idx, value) in fields.iter().enumerate() {
            if idx > 0 {
                press(app, KeyCode::Tab);
            }
            type_text(app, value);
        }
        press(app, KeyCode::Enter);
    }

    fn status_text<S: Storage>(app: &App<S>) -> Option<&str> {
        app.status.as_ref().map(|status| status.text.as_str())
    }

    fn rendered(app: &App<MemoryStorage>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn adding_a_book_saves_it() {
        let mut app = app_with(Vec::new());
        fill_add_form(&mut app, ["dune", "frank herbert", "1965", "sci-fi", "yes"]);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), Some("Book added successfully!"));
        let saved = app.store().storage().saved();
        assert_eq!(saved, vec![Book::new("Dune", "Frank Herbert", 1965, "Sci-Fi", true)]);
    }

    #[test]
    fn bad_year_keeps_form_open() {
        let mut app = app_with(Vec::new());
        fill_add_form(&mut app, ["dune", "frank herbert", "soon", "sci-fi", "no"]);

        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.active, BookField::Year);
                assert!(form.error.is_some());
            }
            _ => panic!("form should stay open"),
        }

        type_text(&mut app, "1965");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store().books().len(), 1);
        assert!(!app.store().books()[0].read);
    }

    #[test]
    fn duplicate_add_warns_without_saving() {
        let mut app = app_with(vec![Book::new("dune", "frank herbert", 1965, "sci-fi", false)]);
        fill_add_form(&mut app, ["DUNE", "Frank Herbert", "2000", "x", "no"]);

        assert_eq!(
            status_text(&app),
            Some("This book already exists in your library.")
        );
        assert_eq!(app.store().storage().save_count(), 0);
        assert_eq!(app.store().books().len(), 1);
    }

    #[test]
    fn remove_reports_result() {
        let mut app = app_with(vec![Book::new("emma", "jane austen", 1815, "romance", true)]);
        press(&mut app, KeyCode::Char('2'));
        type_text(&mut app, "ulysses");
        press(&mut app, KeyCode::Enter);
        assert_eq!(status_text(&app), Some("Book not found!"));

        press(&mut app, KeyCode::Char('2'));
        type_text(&mut app, "emma");
        press(&mut app, KeyCode::Enter);
        assert_eq!(status_text(&app), Some("Book removed successfully!"));
        assert!(app.store().storage().saved().is_empty());
    }

    #[test]
    fn failed_add_save_keeps_form_open() {
        let mut app = app_with(Vec::new());
        app.store().storage().set_fail_saves(true);
        fill_add_form(&mut app, ["dune", "frank herbert", "1965", "sci-fi", "yes"]);

        let expected = "failed to save library: failed to write memory: disk full";
        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.error.as_deref(), Some(expected));
                assert_eq!(form.value(BookField::Title), "dune");
            }
            _ => panic!("form should stay open"),
        }
        assert_eq!(status_text(&app), Some(expected));
        assert_eq!(app.status.as_ref().map(|status| status.kind), Some(StatusKind::Error));
        assert!(app.store().books().is_empty());
        assert!(rendered(&app).contains("disk full"));

        app.store().storage().set_fail_saves(false);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), Some("Book added successfully!"));
        assert_eq!(app.store().storage().saved().len(), 1);
    }

    #[test]
    fn failed_remove_save_keeps_prompt_open() {
        let seed = vec![Book::new("emma", "jane austen", 1815, "romance", true)];
        let mut app = app_with(seed.clone());
        app.store().storage().set_fail_saves(true);
        press(&mut app, KeyCode::Char('2'));
        type_text(&mut app, "emma");
        press(&mut app, KeyCode::Enter);

        match &app.mode {
            Mode::RemovingBook(form) => assert_eq!(form.value, "emma"),
            _ => panic!("prompt should stay open"),
        }
        assert_eq!(
            status_text(&app),
            Some("failed to save library: failed to write memory: disk full")
        );
        assert_eq!(app.store().books(), seed.as_slice());
    }

    #[test]
    fn invalid_menu_choice_is_reported() {
        let mut app = app_with(Vec::new());
        assert!(!press(&mut app, KeyCode::Char('9')));
        assert_eq!(
            status_text(&app),
            Some("Invalid choice! Please enter a number between 1-6.")
        );
        assert!(matches!(app.screen, Screen::Menu));
    }

    #[test]
    fn invalid_search_field_aborts() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Char('3'));
        type_text(&mut app, "7");
        press(&mut app, KeyCode::Enter);
        assert_eq!(status_text(&app), Some("Invalid choice!"));
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn search_shows_suggestions() {
        let mut app = app_with(vec![Book::new("neuromancer", "william gibson", 1984, "sci-fi", false)]);
        press(&mut app, KeyCode::Char('3'));
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "gibson");
        press(&mut app, KeyCode::Enter);

        match &app.screen {
            Screen::SearchResults(search) => {
                assert!(search.results.matches.is_empty());
                assert_eq!(search.results.suggestions, vec!["Neuromancer".to_string()]);
            }
            _ => panic!("expected search results"),
        }
        let screen = rendered(&app);
        assert!(screen.contains("Did you mean:"));
        assert!(screen.contains("- Neuromancer"));
    }

    #[test]
    fn display_all_on_empty_library_warns() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(status_text(&app), Some("Your library is empty!"));
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn display_all_sorts_and_cycles() {
        let mut app = app_with(vec![
            Book::new("zeta", "amy", 2001, "x", false),
            Book::new("alpha", "zoe", 1999, "x", true),
        ]);
        press(&mut app, KeyCode::Char('4'));
        type_text(&mut app, "unknown");
        press(&mut app, KeyCode::Enter);

        match &app.screen {
            Screen::Books(list) => {
                assert_eq!(list.sort, SortKey::Title);
                assert_eq!(list.books[0].title, "Alpha");
            }
            _ => panic!("expected book list"),
        }

        press(&mut app, KeyCode::Tab);
        match &app.screen {
            Screen::Books(list) => {
                assert_eq!(list.sort, SortKey::Author);
                assert_eq!(list.books[0].title, "Zeta");
            }
            _ => panic!("expected book list"),
        }
        assert!(rendered(&app).contains("1. Zeta by Amy (2001) - X - Unread"));
    }

    #[test]
    fn statistics_screen_and_empty_case() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(status_text(&app), Some("No books in library!"));

        let mut app = app_with(vec![
            Book::new("a", "x", 1, "poetry", true),
            Book::new("b", "x", 2, "poetry", false),
        ]);
        press(&mut app, KeyCode::Char('5'));
        let screen = rendered(&app);
        assert!(screen.contains("Books read: 1 (50.00%)"));
        assert!(screen.contains("Most common genre: Poetry"));
    }

    #[test]
    fn exit_saves_once_more() {
        let mut app = app_with(Vec::new());
        assert!(press(&mut app, KeyCode::Char('6')));
        assert_eq!(app.store().storage().save_count(), 1);
    }

    #[test]
    fn failed_exit_save_stays_open() {
        let mut app = app_with(Vec::new());
        app.store().storage().set_fail_saves(true);
        assert!(!press(&mut app, KeyCode::Char('6')));
        assert!(matches!(app.screen, Screen::Menu));
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(
            status_text(&app),
            Some("failed to save library: failed to write memory: disk full")
        );

        app.store().storage().set_fail_saves(false);
        assert!(press(&mut app, KeyCode::Char('6')));
        assert_eq!(app.store().storage().save_count(), 1);
    }

    #[test]
    fn ctrl_c_closes_dialog_and_exits() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Char('1'));
        type_text(&mut app, "half typed");
        assert!(app.handle_ctrl_c().unwrap());
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.store().books().is_empty());
        assert_eq!(app.store().storage().save_count(), 1);
    }

    #[test]
    fn menu_renders_all_choices() {
        let app = app_with(Vec::new());
        let screen = rendered(&app);
        for (idx, choice) in MenuChoice::ALL.iter().enumerate() {
            assert!(screen.contains(&format!("{}. {}", idx + 1, choice.label())));
        }
    }
}
