//! Enumerations for TUI state management.

/// Screen currently shown.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    TaskList,
    Help,
}

/// Which widget receives key presses on the task list screen.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Focus {
    List,
    NewTask,
    Search,
    Edit,
}

impl Focus {
    /// Short hint for the status bar.
    pub fn hint(self) -> &'static str {
        match self {
            Focus::List => "a add  / search  f filter  space toggle  e edit  d remove  h help  q quit",
            Focus::NewTask => "Type a task, Enter to add, Esc to return",
            Focus::Search => "Type to search, Enter to keep, Esc to clear",
            Focus::Edit => "Enter to save, Esc to cancel",
        }
    }
}
