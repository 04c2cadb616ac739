//! # todo - Personal Todo List
//!
//! A small todo list manager with a one-shot CLI and an interactive terminal user
//! interface (TUI) over the same task list.
//!
//! ## Key Features
//!
//! - **Quick Capture**: add, complete, edit and remove short text tasks
//! - **Filtering**: show all, complete or incomplete tasks, narrowed by case-insensitive search
//! - **Inline Editing**: edit one task at a time directly in the list
//! - **Local Storage**: every change is written straight to a JSON key-value file
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! todo
//!
//! # Add a task via CLI
//! todo add Buy milk
//!
//! # List incomplete tasks mentioning "milk"
//! todo list --category incomplete --search milk
//!
//! # Mark it done
//! todo toggle 1718000000000
//! ```
//!
//! Data is stored in `~/.todo/store.json` unless `--store` or `TODO_STORE` points elsewhere.
//! The stored `todos` value is a flat JSON array of `{id, text, completed}` objects.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod logging;
pub mod manager;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use error::AppResult;
use manager::TaskListManager;
use store::FileStore;

fn run(cli: Cli) -> AppResult<()> {
    let config = Config::from_cli(&cli);
    let command = cli.command.unwrap_or(Commands::Ui);

    let is_ui = matches!(command, Commands::Ui);
    if let Err(e) = logging::init(&config, is_ui) {
        eprintln!("Logging disabled: {e}");
    }

    // Commands that don't need the store
    match command {
        Commands::Ui => return cmd_ui(&config.store_path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return Ok(());
        }
        _ => {}
    }

    let mut manager = TaskListManager::load(FileStore::open(&config.store_path));

    match command {
        Commands::Ui | Commands::Completions { .. } => unreachable!("handled above"),
        Commands::Add { text } => cmd_add(&mut manager, text),
        Commands::List { category, search } => {
            cmd_list(&manager, category, search);
            Ok(())
        }
        Commands::Toggle { id } => cmd_toggle(&mut manager, id),
        Commands::Remove { id } => cmd_remove(&mut manager, id),
        Commands::Edit { id, text } => cmd_edit(&mut manager, id, text),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
