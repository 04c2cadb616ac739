//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header and focused borders
pub const ACCENT_BLUE: Color = Color::Rgb(37, 99, 235);
/// Edit row and save hint
pub const SAVE_GREEN: Color = Color::Rgb(22, 163, 74);
/// Remove action
pub const REMOVE_RED: Color = Color::Rgb(220, 38, 38);
/// Completed tasks
pub const DONE_GRAY: Color = Color::Rgb(156, 163, 175);
