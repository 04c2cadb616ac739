//! TUI entry point and terminal setup.

use std::{
    io::{self, Write},
    path::Path,
};

use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::error::AppResult;
use crate::manager::TaskListManager;
use crate::store::FileStore;
use crate::tui::app::App;

/// Leave the alternate screen, stop mouse capture and show the cursor on `out`.
fn restore_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, DisableMouseCapture, Show)
}

/// Raw mode and alternate screen for as long as the guard lives. Dropping it puts the
/// terminal back, including when setup fails halfway or the app returns an error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::warn!("Failed to leave raw mode: {e}");
        }
        if let Err(e) = restore_screen(&mut io::stdout()) {
            log::warn!("Failed to restore terminal: {e}");
        }
    }
}

/// Load the store, then run the terminal UI until the user quits.
pub fn run_tui(store_path: &Path) -> AppResult<()> {
    let store = FileStore::open(store_path);
    log::info!("Opening TUI on {}", store.path().display());
    let mut app = App::new(TaskListManager::load(store));

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    app.run(&mut terminal)?;
    Ok(())
}
