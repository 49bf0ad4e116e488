//! Binary entry point: resolve configuration, start logging, load the
//! library once, and hand control to the menu until the user exits.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use library_manager::{logging, run_app, App, BookStore, Config, JsonFileStorage};

#[derive(Debug, Parser)]
#[command(name = "library-manager", version, about = "Personal book collection manager")]
struct Cli {
    /// Library file (default: ~/.library-manager/library.json)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Log file (default: next to the library file)
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

/// A library file that exists but cannot be parsed aborts startup instead
/// of being replaced with an empty collection.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.file, cli.log);
    logging::init(&config.log_file())?;

    let storage = JsonFileStorage::new(&config.library_path);
    let store = BookStore::open(storage)
        .with_context(|| format!("failed to load {}", config.library_path.display()))?;

    let mut app = App::new(store);
    run_app(&mut app)?;

    log::info!("session ended with {} books", app.store().books().len());
    println!("Library saved. Goodbye!");
    Ok(())
}
