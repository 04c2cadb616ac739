use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Todo list manager with local, file-backed storage.
/// Storage defaults to ~/.todo/store.json or a path passed via --store.
#[derive(Parser)]
#[command(name = "todo", version, about = "Personal todo list CLI and terminal UI")]
pub struct Cli {
    /// Path to the JSON store file.
    #[arg(long, global = true, env = "TODO_STORE")]
    pub store: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
