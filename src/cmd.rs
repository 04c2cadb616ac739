//! Command implementations for the CLI interface.
//!
//! Each subcommand maps onto one or more `TaskListManager` operations and prints a
//! short confirmation. Unknown ids and blank text are reported, never fatal.

use std::path::Path;

use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::error::AppResult;
use crate::fields::{CategoryFilter, FilterState};
use crate::manager::TaskListManager;
use crate::store::KeyValueStore;
use crate::task::{Task, TaskId};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal UI (default).
    Ui,

    /// Add a new task.
    Add {
        /// Task text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks.
    List {
        /// Completion category: all | complete | incomplete.
        #[arg(long, value_enum, default_value_t = CategoryFilter::All)]
        category: CategoryFilter,
        /// Case-insensitive text to search for.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Flip a task between complete and incomplete.
    Toggle {
        /// Task ID.
        id: TaskId,
    },

    /// Remove a task.
    Remove {
        /// Task ID.
        id: TaskId,
    },

    /// Replace a task's text.
    Edit {
        /// Task ID.
        id: TaskId,
        /// New text; may be empty.
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },

    /// Generate shell completion script.
    Completions {
        /// Shell type.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal UI on the store at `store_path`.
pub fn cmd_ui(store_path: &Path) -> AppResult<()> {
    run_tui(store_path)
}

/// Add a task from the given words.
pub fn cmd_add<S: KeyValueStore>(m: &mut TaskListManager<S>, text: Vec<String>) -> AppResult<()> {
    match m.add(&text.join(" "))? {
        Some(id) => println!("Added {id}"),
        None => println!("Nothing added: task text is empty."),
    }
    Ok(())
}

/// Print the tasks passing the given filters.
pub fn cmd_list<S: KeyValueStore>(m: &TaskListManager<S>, category: CategoryFilter, search: String) {
    let filter = FilterState::new(category, search);
    let visible = m.compute_visible(&filter);
    if visible.is_empty() {
        if m.tasks().is_empty() {
            println!("No tasks yet.");
        } else {
            println!("No tasks match the current filter.");
        }
        return;
    }
    print!("{}", format_table(&visible));
    if !filter.is_default() {
        println!("({} of {} shown)", visible.len(), m.tasks().len());
    }
}

/// Toggle completion of a task.
pub fn cmd_toggle<S: KeyValueStore>(m: &mut TaskListManager<S>, id: TaskId) -> AppResult<()> {
    if m.toggle(id)? {
        let state = match m.get(id) {
            Some(t) if t.completed => "complete",
            _ => "incomplete",
        };
        println!("Task {id} is now {state}");
    } else {
        println!("Task {id} not found.");
    }
    Ok(())
}

/// Remove a task.
pub fn cmd_remove<S: KeyValueStore>(m: &mut TaskListManager<S>, id: TaskId) -> AppResult<()> {
    if m.remove(id)? {
        println!("Removed {id}");
    } else {
        println!("Task {id} not found.");
    }
    Ok(())
}

/// Edit a task in one step: start, replace the buffer, save.
pub fn cmd_edit<S: KeyValueStore>(m: &mut TaskListManager<S>, id: TaskId, text: Vec<String>) -> AppResult<()> {
    let Some(current) = m.get(id).map(|t| t.text.clone()) else {
        println!("Task {id} not found.");
        return Ok(());
    };
    m.start_edit(id, &current);
    m.set_editing_text(&text.join(" "));
    m.save_edit()?;
    println!("Updated {id}");
    Ok(())
}

/// Generate shell completion script.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Render tasks as a plain-text table.
pub fn format_table(tasks: &[&Task]) -> String {
    let id_width = tasks
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let mut out = format!("{:<id_width$}  {:<4} {}\n", "ID", "Done", "Text");
    for t in tasks {
        let mark = if t.completed { "[x]" } else { "[ ]" };
        out.push_str(&format!("{:<id_width$}  {:<4} {}\n", t.id, mark, t.text));
    }
    out
}
