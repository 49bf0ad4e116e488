use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;
use crate::storage::Storage;

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user exits through the menu. The terminal is restored even when
/// the loop fails.
pub fn run_app<S: Storage>(app: &mut App<S>) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = loop {
        match step(&mut terminal, app) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(err) => break Err(err),
        }
    };

    cleanup_terminal(&mut terminal)?;
    result
}

/// Draw one frame and handle at most one key press.
fn step<S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S>,
) -> Result<bool> {
    terminal
        .draw(|frame| app.draw(frame))
        .context("failed to draw frame")?;

    if !event::poll(Duration::from_millis(250)).context("event polling failed")? {
        return Ok(false);
    }

    if let Event::Key(key_event) = event::read().context("failed to read event")? {
        if key_event.kind != KeyEventKind::Press {
            return Ok(false);
        }
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            return app.handle_ctrl_c();
        }
        return app.handle_key(key_event.code);
    }

    Ok(false)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
