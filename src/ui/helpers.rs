use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::library::Statistics;
use crate::models::Book;

/// `1. Title by Author (Year) - Genre - Read` with a colored status.
pub(crate) fn numbered_book_line(position: usize, book: &Book) -> Line<'static> {
    let status_style = if book.read {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    Line::from(vec![
        Span::styled(
            format!("{position}. "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} - ", book.summary())),
        Span::styled(book.status_label(), status_style),
    ])
}

/// Lines for the statistics panel. Percentages are shown to two decimals.
pub(crate) fn statistics_lines(stats: &Statistics) -> Vec<Line<'static>> {
    let percentage = stats
        .read_percentage
        .map(|pct| format!(" ({pct:.2}%)"))
        .unwrap_or_default();
    vec![
        Line::from(format!("Total books: {}", stats.total)),
        Line::from(format!("Books read: {}{}", stats.read, percentage)),
        Line::from(format!("Books unread: {}", stats.unread)),
        Line::from(format!("Most common genre: {}", stats.genre_label())),
    ]
}

/// Footer hint line made of `[key] action` pairs.
pub(crate) fn key_hints(pairs: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (idx, (key, action)) in pairs.iter().enumerate() {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        if idx + 1 == pairs.len() {
            spans.push(Span::raw(format!(" {action}")));
        } else {
            spans.push(Span::raw(format!(" {action}   ")));
        }
    }
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Render an error with its whole cause chain on one line.
pub(crate) fn surface_error(err: &Error) -> String {
    format!("{err:#}")
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::error::StorageError;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn numbered_line_matches_listing_format() {
        let book = Book::new("dune", "frank herbert", 1965, "sci-fi", false);
        assert_eq!(
            text(&numbered_book_line(1, &book)),
            "1. Dune by Frank Herbert (1965) - Sci-Fi - Unread"
        );
    }

    #[test]
    fn statistics_show_two_decimals() {
        let stats = Statistics {
            total: 3,
            read: 1,
            unread: 2,
            read_percentage: Some(100.0 / 3.0),
            most_common_genre: Some("Sci-Fi".into()),
        };
        let lines: Vec<String> = statistics_lines(&stats).iter().map(text).collect();
        assert_eq!(lines[1], "Books read: 1 (33.33%)");
        assert_eq!(lines[3], "Most common genre: Sci-Fi");
    }

    #[test]
    fn surface_error_keeps_every_cause() {
        let err = anyhow!("disk full")
            .context("failed to write /tmp/library.json")
            .context("failed to save library");
        assert_eq!(
            surface_error(&err),
            "failed to save library: failed to write /tmp/library.json: disk full"
        );
    }

    #[test]
    fn surface_error_shows_storage_path_once() {
        let err = Error::new(StorageError::Write {
            path: "/tmp/library.json".into(),
            source: std::io::Error::other("disk full"),
        })
        .context("failed to save library");
        assert_eq!(
            surface_error(&err),
            "failed to save library: failed to write /tmp/library.json: disk full"
        );
    }

    #[test]
    fn key_hints_join_pairs() {
        let line = key_hints(&[("Esc", "Back"), ("q", "Quit")]);
        assert_eq!(text(&line), "[Esc] Back   [q] Quit");
    }
}
