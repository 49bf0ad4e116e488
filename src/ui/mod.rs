//! Ratatui front-end: a six-entry menu over the book store, with modal
//! prompts for input and dedicated screens for listings, search results and
//! statistics.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
