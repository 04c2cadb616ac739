//! Main application logic for the terminal user interface.
//!
//! `App` is the renderer for the task list: it owns the input widgets and the filter,
//! forwards user actions to the `TaskListManager`, and draws the filtered list with
//! the row being edited shown as an input.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::error::StoreError;
use crate::fields::FilterState;
use crate::manager::{RowMode, TaskListManager};
use crate::store::KeyValueStore;
use crate::task::TaskId;
use crate::tui::{
    colors::{ACCENT_BLUE, DONE_GRAY, REMOVE_RED, SAVE_GREEN},
    enums::{AppState, Focus},
    input::InputField,
    utils::centered_rect,
};

/// What the renderer needs to draw one visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub mode: RowMode,
    pub show_actions: bool,
}

/// Terminal UI state layered on top of the task list manager.
pub struct App<S: KeyValueStore> {
    manager: TaskListManager<S>,
    state: AppState,
    focus: Focus,
    new_task: InputField,
    search: InputField,
    edit_input: InputField,
    filter: FilterState,
    visible: Vec<TaskId>,
    task_list_state: TableState,
    status_message: String,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(manager: TaskListManager<S>) -> Self {
        let mut app = App {
            manager,
            state: AppState::TaskList,
            focus: Focus::List,
            new_task: InputField::new(),
            search: InputField::new(),
            edit_input: InputField::new(),
            filter: FilterState::default(),
            visible: Vec::new(),
            task_list_state: TableState::default(),
            status_message: String::new(),
        };
        app.update_visible();
        app
    }

    pub fn manager(&self) -> &TaskListManager<S> {
        &self.manager
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Ids of the rows currently shown, in list order.
    pub fn visible(&self) -> &[TaskId] {
        &self.visible
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Recompute the visible rows, keeping the selection on the same task if it is
    /// still shown.
    fn update_visible(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied();

        self.visible = self
            .manager
            .compute_visible(&self.filter)
            .iter()
            .map(|t| t.id)
            .collect();

        let new_idx = old_selected_id
            .and_then(|id| self.visible.iter().position(|&v| v == id))
            .or_else(|| {
                let prev = self.task_list_state.selected().unwrap_or(0);
                if self.visible.is_empty() {
                    None
                } else {
                    Some(prev.min(self.visible.len() - 1))
                }
            });
        self.task_list_state.select(new_idx);
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .copied()
    }

    /// Rows to draw for the current filter and edit state.
    pub fn rows(&self) -> Vec<RowView> {
        let show_actions = self.manager.actions_visible();
        self.visible
            .iter()
            .filter_map(|&id| self.manager.get(id))
            .map(|task| RowView {
                id: task.id,
                text: task.text.clone(),
                completed: task.completed,
                mode: self.manager.row_mode(task.id),
                show_actions,
            })
            .collect()
    }

    /// Refresh the list after a write; storage failures go to the status bar.
    fn after_write<T>(&mut self, result: Result<T, StoreError>) -> Option<T> {
        self.update_visible();
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("Error saving: {e}");
                self.set_status_message(format!("Error saving: {e}"));
                None
            }
        }
    }

    fn add_task(&mut self) {
        let result = self.manager.add(&self.new_task.value);
        match self.after_write(result) {
            Some(Some(id)) => {
                self.new_task.clear();
                if let Some(idx) = self.visible.iter().position(|&v| v == id) {
                    self.task_list_state.select(Some(idx));
                }
                self.set_status_message("Task added".to_string());
            }
            Some(None) | None => {}
        }
    }

    fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.manager.toggle(id);
            self.after_write(result);
        }
    }

    fn remove_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.manager.remove(id);
            if let Some(true) = self.after_write(result) {
                self.set_status_message("Task removed".to_string());
            }
        }
    }

    fn start_edit_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(text) = self.manager.get(id).map(|t| t.text.clone()) else {
            return;
        };
        self.manager.start_edit(id, &text);
        self.edit_input = InputField::with_value(&text);
        self.focus = Focus::Edit;
    }

    fn finish_edit(&mut self, save: bool) {
        if save {
            let result = self.manager.save_edit();
            if let Some(true) = self.after_write(result) {
                self.set_status_message("Task updated".to_string());
            }
        } else {
            self.manager.cancel_edit();
        }
        self.edit_input.clear();
        self.focus = Focus::List;
    }

    fn cycle_category(&mut self) {
        self.filter.category = self.filter.category.next();
        self.update_visible();
        self.set_status_message(format!(
            "Showing {} ({} tasks)",
            self.filter.category.label(),
            self.visible.len()
        ));
    }

    /// Apply common line-editing keys to `field`. Returns true if the key was used.
    fn edit_field(field: &mut InputField, key: KeyCode) -> bool {
        match key {
            KeyCode::Char(c) => field.handle_char(c),
            KeyCode::Backspace => field.handle_backspace(),
            KeyCode::Delete => field.handle_delete(),
            KeyCode::Left => field.move_cursor_left(),
            KeyCode::Right => field.move_cursor_right(),
            KeyCode::Home => field.move_home(),
            KeyCode::End => field.move_end(),
            _ => return false,
        }
        true
    }

    fn handle_list_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected > 0 {
                        self.task_list_state.select(Some(selected - 1));
                    }
                } else if !self.visible.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Down => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected + 1 < self.visible.len() {
                        self.task_list_state.select(Some(selected + 1));
                    }
                } else if !self.visible.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => self.toggle_selected(),
            KeyCode::Char('a') | KeyCode::Char('i') => self.focus = Focus::NewTask,
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('f') => self.cycle_category(),
            KeyCode::Char('e') if self.manager.actions_visible() => self.start_edit_selected(),
            KeyCode::Char('d') if self.manager.actions_visible() => self.remove_selected(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_new_task_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.add_task(),
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::List,
            _ => {
                Self::edit_field(&mut self.new_task, key);
            }
        }
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Tab => self.focus = Focus::List,
            KeyCode::Esc => {
                self.search.clear();
                self.filter.text.clear();
                self.update_visible();
                self.focus = Focus::List;
            }
            _ => {
                if Self::edit_field(&mut self.search, key) {
                    self.filter.text = self.search.value.clone();
                    self.update_visible();
                }
            }
        }
    }

    fn handle_edit_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => self.finish_edit(true),
            KeyCode::Esc => self.finish_edit(false),
            _ => {
                if Self::edit_field(&mut self.edit_input, key) {
                    self.manager.set_editing_text(&self.edit_input.value);
                }
            }
        }
    }

    /// Dispatch one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return true;
        }
        self.status_message.clear();

        if self.state == AppState::Help {
            if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')) {
                self.state = AppState::TaskList;
            }
            return false;
        }

        match self.focus {
            Focus::List => return self.handle_list_input(key),
            Focus::NewTask => self.handle_new_task_input(key),
            Focus::Search => self.handle_search_input(key),
            Focus::Edit => self.handle_edit_input(key),
        }
        false
    }

    /// Poll for and handle one keyboard event. Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn border_style(&self, focus: Focus) -> Style {
        if self.focus == focus {
            Style::default().fg(ACCENT_BLUE)
        } else {
            Style::default()
        }
    }

    /// Text of an input with the cursor cell reversed when focused.
    fn input_line(field: &InputField, focused: bool, placeholder: &str) -> Line<'static> {
        if field.value.is_empty() && !focused {
            return Line::from(Span::styled(
                placeholder.to_string(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if !focused {
            return Line::from(field.value.clone());
        }
        let before: String = field.value.chars().take(field.cursor).collect();
        let at: String = field.value.chars().nth(field.cursor).map(String::from).unwrap_or_else(|| " ".to_string());
        let after: String = field.value.chars().skip(field.cursor + 1).collect();
        Line::from(vec![
            Span::raw(before),
            Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(after),
        ])
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let done = self.manager.tasks().iter().filter(|t| t.completed).count();
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "MY TODO LIST",
                Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{done}/{} done", self.manager.tasks().len()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_new_task(&self, f: &mut Frame, area: Rect) {
        let input = Paragraph::new(Self::input_line(
            &self.new_task,
            self.focus == Focus::NewTask,
            "Add a new todo... (a)",
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("New task")
                .border_style(self.border_style(Focus::NewTask)),
        );
        f.render_widget(input, area);
    }

    fn render_filters(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(18), Constraint::Min(0)])
            .split(area);

        let category = Paragraph::new(self.filter.category.label())
            .block(Block::default().borders(Borders::ALL).title("Show (f)"))
            .alignment(Alignment::Center);
        f.render_widget(category, chunks[0]);

        let search = Paragraph::new(Self::input_line(
            &self.search,
            self.focus == Focus::Search,
            "Search todos... (/)",
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search")
                .border_style(self.border_style(Focus::Search)),
        );
        f.render_widget(search, chunks[1]);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .rows()
            .into_iter()
            .map(|row| {
                let mark = if row.completed { "[x]" } else { "[ ]" };
                let text_cell = match row.mode {
                    RowMode::Edit => Cell::from(Self::input_line(&self.edit_input, true, ""))
                        .style(Style::default().fg(SAVE_GREEN)),
                    RowMode::Display => {
                        let style = if row.completed {
                            Style::default().fg(DONE_GRAY).add_modifier(Modifier::CROSSED_OUT)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        Cell::from(row.text).style(style)
                    }
                };
                let actions = if row.show_actions {
                    Cell::from(Line::from(vec![
                        Span::styled("e Edit", Style::default().fg(ACCENT_BLUE)),
                        Span::raw("  "),
                        Span::styled("d Remove", Style::default().fg(REMOVE_RED)),
                    ]))
                } else if row.mode == RowMode::Edit {
                    Cell::from(Span::styled("Enter Save  Esc Cancel", Style::default().fg(SAVE_GREEN)))
                } else {
                    Cell::from("")
                };
                Row::new(vec![Cell::from(mark), text_cell, actions])
            })
            .collect();

        let header = Row::new(["", "Task", "Actions"].iter().map(|h| {
            Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(ACCENT_BLUE).fg(Color::White))
        .height(1);

        let widths = [
            Constraint::Length(3),
            Constraint::Min(20),
            Constraint::Length(22),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.visible.len(),
                self.manager.tasks().len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 70, area);
        f.render_widget(Clear, area);

        let key = |k: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("{k:<10}"), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(what),
            ])
        };
        let text = vec![
            key("a / i", "Focus the new task input"),
            key("Enter", "Add task / save edit"),
            key("Space c", "Toggle complete"),
            key("e", "Edit selected task"),
            key("d", "Remove selected task"),
            key("f", "Cycle All / Complete / Incomplete"),
            key("/", "Search (Esc clears)"),
            key("Esc", "Leave input / cancel edit / quit"),
            key("q", "Quit"),
            Line::from(""),
            Line::from("Edit and remove are unavailable while a task is being edited."),
        ];
        let help = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(help, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if !self.filter.is_default() {
            format!(
                "Tasks: {} (filtered) | {}",
                self.visible.len(),
                self.focus.hint()
            )
        } else {
            self.focus.hint().to_string()
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT_BLUE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Draw the whole screen.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_new_task(f, chunks[1]);
        self.render_filters(f, chunks[2]);
        self.render_task_list(f, chunks[3]);
        self.render_status_bar(f, chunks[4]);

        if self.state == AppState::Help {
            self.render_help(f, f.area());
        }
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
