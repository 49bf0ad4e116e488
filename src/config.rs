//! Runtime configuration: where the library file and the log live.
//!
//! Values resolve in this order: command-line flags, then the
//! `LIBRARY_MANAGER_FILE` / `LIBRARY_MANAGER_LOG` environment variables, then
//! defaults under the user's home directory.

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-manager";
/// Backing file name inside the data directory.
const LIBRARY_FILE_NAME: &str = "library.json";
/// Log file name, written next to the backing file by default.
const LOG_FILE_NAME: &str = "library-manager.log";

pub const LIBRARY_FILE_ENV: &str = "LIBRARY_MANAGER_FILE";
pub const LOG_FILE_ENV: &str = "LIBRARY_MANAGER_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON document holding the whole collection.
    pub library_path: PathBuf,
    /// Explicit log destination. `None` means next to `library_path`.
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            log_path: None,
        }
    }
}

impl Config {
    /// Resolve configuration from optional CLI overrides and the environment.
    pub fn resolve(library_flag: Option<PathBuf>, log_flag: Option<PathBuf>) -> Self {
        Self::resolve_with(library_flag, log_flag, |key| env::var_os(key).map(PathBuf::from))
    }

    fn resolve_with(
        library_flag: Option<PathBuf>,
        log_flag: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<PathBuf>,
    ) -> Self {
        let library_path = library_flag
            .or_else(|| lookup(LIBRARY_FILE_ENV))
            .unwrap_or_else(default_library_path);
        let log_path = log_flag.or_else(|| lookup(LOG_FILE_ENV));
        Self {
            library_path,
            log_path,
        }
    }

    /// Where log output should go.
    pub fn log_file(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| self.library_path.with_file_name(LOG_FILE_NAME))
    }
}

/// `~/.library-manager/library.json`, or `./library.json` when no home
/// directory can be found.
fn default_library_path() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(DATA_DIR_NAME).join(LIBRARY_FILE_NAME),
        None => PathBuf::from(LIBRARY_FILE_NAME),
    }
}
