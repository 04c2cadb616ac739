//! Runtime configuration resolved from the command line.
//!
//! The store defaults to `~/.todo/store.json`; the log file sits beside it.

use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Name of the directory under the home directory holding the store.
pub const TODO_DIR: &str = ".todo";
pub const STORE_FILE: &str = "store.json";
pub const LOG_FILE: &str = "todo.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub log_path: PathBuf,
    pub verbose: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::resolve(cli.store.as_deref(), &home, cli.verbose)
    }

    /// An explicit store path wins over the home-directory default.
    pub fn resolve(store: Option<&Path>, home: &Path, verbose: bool) -> Self {
        let store_path = match store {
            Some(path) => path.to_path_buf(),
            None => home.join(TODO_DIR).join(STORE_FILE),
        };
        let log_path = store_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_FILE);
        Config {
            store_path,
            log_path,
            verbose,
        }
    }
}
