//! Task list state and its transitions.
//!
//! `TaskListManager` owns the ordered task list and the single in-progress edit. Every
//! change to the list is written through to the key-value store before the call
//! returns. Invalid input (blank text, unknown ids) is a silent no-op.

use chrono::Utc;

use crate::error::StoreError;
use crate::fields::FilterState;
use crate::store::{KeyValueStore, TODOS_KEY};
use crate::task::{Task, TaskId};

/// Which task, if any, is being edited, together with its edit buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing { id: TaskId, text: String },
}

impl EditState {
    pub fn editing_id(&self) -> Option<TaskId> {
        match self {
            EditState::Idle => None,
            EditState::Editing { id, .. } => Some(*id),
        }
    }

    pub fn editing_text(&self) -> Option<&str> {
        match self {
            EditState::Idle => None,
            EditState::Editing { text, .. } => Some(text),
        }
    }
}

/// How the renderer should draw a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Display,
    Edit,
}

/// Tasks matching `filter`, in list order.
pub fn compute_visible<'a>(tasks: &'a [Task], filter: &FilterState) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Parse a stored task list. Absent or malformed data is an empty list.
pub fn parse_tasks(raw: Option<&str>) -> Vec<Task> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            log::warn!("Stored task list is malformed, starting empty: {e}");
            Vec::new()
        }
    }
}

pub struct TaskListManager<S: KeyValueStore> {
    store: S,
    tasks: Vec<Task>,
    edit: EditState,
}

impl<S: KeyValueStore> TaskListManager<S> {
    /// Build the manager from whatever the store holds under `todos`.
    pub fn load(store: S) -> Self {
        let raw = match store.get(TODOS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Error reading stored tasks, starting empty: {e}");
                None
            }
        };
        let tasks = parse_tasks(raw.as_deref());
        log::debug!("Loaded {} task(s)", tasks.len());
        TaskListManager {
            store,
            tasks,
            edit: EditState::Idle,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn is_editing(&self) -> bool {
        self.edit != EditState::Idle
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write the whole list under `todos`.
    fn persist(&mut self) -> Result<(), StoreError> {
        let data = serde_json::to_string(&self.tasks)?;
        self.store.set(TODOS_KEY, &data)
    }

    /// Creation-time id, bumped past the largest existing id so two tasks created in
    /// the same millisecond still get distinct ids. When the largest id is already
    /// `TaskId::MAX`, the first unused id from `now_ms` upwards (wrapping) is taken.
    fn next_id(&self, now_ms: TaskId) -> Option<TaskId> {
        match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if max >= now_ms => match max.checked_add(1) {
                Some(id) => Some(id),
                None => (now_ms..=TaskId::MAX)
                    .chain(TaskId::MIN..now_ms)
                    .find(|id| self.get(*id).is_none()),
            },
            _ => Some(now_ms),
        }
    }

    /// Append a task with the trimmed `text`. Returns `None` when the trimmed text is
    /// empty, in which case nothing changes and the caller should keep its input.
    pub fn add(&mut self, text: &str) -> Result<Option<TaskId>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let Some(id) = self.next_id(Utc::now().timestamp_millis()) else {
            log::warn!("No free task id, nothing added");
            return Ok(None);
        };
        self.tasks.push(Task::new(id, text));
        log::info!("Added task {id}");
        self.persist()?;
        Ok(Some(id))
    }

    /// Flip `completed` on the task with `id`. Returns whether a task matched.
    pub fn toggle(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let found = match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                log::info!("Task {id} completed={}", task.completed);
                true
            }
            None => {
                log::debug!("Toggle ignored, no task {id}");
                false
            }
        };
        self.persist()?;
        Ok(found)
    }

    /// Delete the task with `id`. Removing the task under edit also ends the edit.
    pub fn remove(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let found = self.tasks.len() != before;
        if found {
            log::info!("Removed task {id}");
        } else {
            log::debug!("Remove ignored, no task {id}");
        }
        if self.edit.editing_id() == Some(id) {
            self.edit = EditState::Idle;
        }
        self.persist()?;
        Ok(found)
    }

    /// Begin editing `id` with `current_text` in the buffer. Any edit already in
    /// progress is dropped without saving.
    pub fn start_edit(&mut self, id: TaskId, current_text: &str) {
        if let Some(prev) = self.edit.editing_id() {
            if prev != id {
                log::debug!("Abandoning edit of task {prev}");
            }
        }
        self.edit = EditState::Editing {
            id,
            text: current_text.to_string(),
        };
    }

    /// Replace the edit buffer. Ignored while idle.
    pub fn set_editing_text(&mut self, text: &str) {
        if let EditState::Editing { text: buf, .. } = &mut self.edit {
            buf.clear();
            buf.push_str(text);
        }
    }

    /// Commit the edit buffer, trimmed, to the task under edit and return to idle.
    /// Unlike `add`, an empty result is accepted. Returns whether a task was updated.
    pub fn save_edit(&mut self) -> Result<bool, StoreError> {
        let EditState::Editing { id, text } = std::mem::take(&mut self.edit) else {
            return Ok(false);
        };
        let found = match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.text = text.trim().to_string();
                log::info!("Edited task {id}");
                true
            }
            None => false,
        };
        self.persist()?;
        Ok(found)
    }

    /// Drop the edit buffer without touching the list.
    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
    }

    pub fn compute_visible(&self, filter: &FilterState) -> Vec<&Task> {
        compute_visible(&self.tasks, filter)
    }

    /// Edit mode only for the row currently under edit.
    pub fn row_mode(&self, id: TaskId) -> RowMode {
        if self.edit.editing_id() == Some(id) {
            RowMode::Edit
        } else {
            RowMode::Display
        }
    }

    /// Row actions (edit, remove) are hidden on every row while any edit is active.
    pub fn actions_visible(&self) -> bool {
        !self.is_editing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::CategoryFilter;
    use crate::store::{FailingStore, MemoryStore};
    use proptest::prelude::*;

    fn manager() -> TaskListManager<MemoryStore> {
        TaskListManager::load(MemoryStore::new())
    }

    fn stored(m: &TaskListManager<MemoryStore>) -> Vec<Task> {
        let raw = m.store().get(TODOS_KEY).unwrap();
        parse_tasks(raw.as_deref())
    }

    fn all() -> FilterState {
        FilterState::default()
    }

    #[test]
    fn test_load_empty_store() {
        assert!(manager().tasks().is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let m = TaskListManager::load(MemoryStore::with_entry(TODOS_KEY, "{oops"));
        assert!(m.tasks().is_empty());
        let m = TaskListManager::load(MemoryStore::with_entry(TODOS_KEY, r#"{"id":1}"#));
        assert!(m.tasks().is_empty());
    }

    #[test]
    fn test_load_existing_tasks() {
        let raw = r#"[{"id":2,"text":"b","completed":true},{"id":1,"text":"a","completed":false}]"#;
        let m = TaskListManager::load(MemoryStore::with_entry(TODOS_KEY, raw));
        let ids: Vec<TaskId> = m.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(m.get(2).unwrap().completed);
    }

    #[test]
    fn test_add_persists_single_task() {
        let mut m = manager();
        let id = m.add("Buy milk").unwrap().unwrap();
        assert_eq!(m.tasks(), &[Task::new(id, "Buy milk")]);
        assert_eq!(stored(&m), vec![Task::new(id, "Buy milk")]);
    }

    #[test]
    fn test_add_rejects_blank() {
        let mut m = manager();
        assert_eq!(m.add("").unwrap(), None);
        assert_eq!(m.add("   ").unwrap(), None);
        assert!(m.tasks().is_empty());
        assert_eq!(m.store().get(TODOS_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_trims_text() {
        let mut m = manager();
        let id = m.add("  walk dog \n").unwrap().unwrap();
        assert_eq!(m.get(id).unwrap().text, "walk dog");
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut m = manager();
        let ids: Vec<TaskId> = (0..50).map(|i| m.add(&format!("t{i}")).unwrap().unwrap()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_next_id_prefers_clock() {
        let mut m = manager();
        assert_eq!(m.next_id(1000), Some(1000));
        m.tasks.push(Task::new(5000, "future"));
        assert_eq!(m.next_id(1000), Some(5001));
        assert_eq!(m.next_id(9000), Some(9000));
    }

    #[test]
    fn test_next_id_at_max() {
        let raw = format!(r#"[{{"id":{},"text":"a","completed":false}}]"#, TaskId::MAX);
        let mut m = TaskListManager::load(MemoryStore::with_entry(TODOS_KEY, &raw));
        assert_eq!(m.next_id(1000), Some(1000));

        m.tasks.push(Task::new(1000, "taken"));
        assert_eq!(m.next_id(1000), Some(1001));

        let id = m.add("b").unwrap().unwrap();
        assert_ne!(id, TaskId::MAX);
        assert_eq!(m.tasks().len(), 3);
        assert_eq!(m.get(id).unwrap().text, "b");
        assert_eq!(stored(&m).len(), 3);
    }

    #[test]
    fn test_write_failure_keeps_mutation() {
        let mut m = TaskListManager::load(FailingStore::default());

        assert!(matches!(m.add("Buy milk"), Err(StoreError::Io { .. })));
        assert_eq!(m.tasks().len(), 1);
        let id = m.tasks()[0].id;
        assert_eq!(m.tasks()[0].text, "Buy milk");

        assert!(m.toggle(id).is_err());
        assert!(m.get(id).unwrap().completed);

        m.start_edit(id, "Buy milk");
        m.set_editing_text("Buy eggs");
        assert!(m.save_edit().is_err());
        assert_eq!(m.get(id).unwrap().text, "Buy eggs");
        assert!(!m.is_editing());

        assert!(m.remove(id).is_err());
        assert!(m.tasks().is_empty());
    }

    #[test]
    fn test_blank_add_does_not_touch_failing_store() {
        let mut m = TaskListManager::load(FailingStore::default());
        assert_eq!(m.add("  ").unwrap(), None);
        assert!(m.tasks().is_empty());
    }

    #[test]
    fn test_toggle_and_filters() {
        let mut m = manager();
        let id = m.add("Buy milk").unwrap().unwrap();
        assert!(m.toggle(id).unwrap());
        assert!(m.get(id).unwrap().completed);
        assert!(stored(&m)[0].completed);

        let complete = m.compute_visible(&FilterState::new(CategoryFilter::Complete, ""));
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].id, id);
        assert!(m
            .compute_visible(&FilterState::new(CategoryFilter::Incomplete, ""))
            .is_empty());
    }

    #[test]
    fn test_toggle_unknown_id() {
        let mut m = manager();
        m.add("a").unwrap();
        let before = m.tasks().to_vec();
        assert!(!m.toggle(42).unwrap());
        assert_eq!(m.tasks(), &before[..]);
    }

    #[test]
    fn test_text_filter() {
        let mut m = manager();
        let milk = m.add("Buy milk").unwrap().unwrap();
        m.add("Buy bread").unwrap();
        let visible = m.compute_visible(&FilterState::new(CategoryFilter::All, "milk"));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, milk);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut m = manager();
        let a = m.add("a").unwrap().unwrap();
        let b = m.add("b").unwrap().unwrap();
        assert!(m.remove(a).unwrap());
        assert!(!m.remove(a).unwrap());
        assert_eq!(m.tasks(), &[Task::new(b, "b")]);
        assert_eq!(stored(&m), vec![Task::new(b, "b")]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut m = manager();
        m.add("a").unwrap();
        let before = m.tasks().to_vec();
        assert!(!m.remove(-1).unwrap());
        assert_eq!(m.tasks(), &before[..]);
    }

    #[test]
    fn test_remove_task_under_edit_ends_edit() {
        let mut m = manager();
        let a = m.add("a").unwrap().unwrap();
        let b = m.add("b").unwrap().unwrap();
        m.start_edit(a, "a");
        m.remove(b).unwrap();
        assert_eq!(m.edit_state().editing_id(), Some(a));
        m.remove(a).unwrap();
        assert_eq!(m.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_save_edit() {
        let mut m = manager();
        let id = m.add("Buy milk").unwrap().unwrap();
        m.start_edit(id, "Buy milk");
        m.set_editing_text("Buy eggs");
        assert!(m.save_edit().unwrap());
        assert_eq!(m.get(id).unwrap().text, "Buy eggs");
        assert_eq!(stored(&m)[0].text, "Buy eggs");
        assert_eq!(m.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_save_edit_accepts_empty_text() {
        let mut m = manager();
        let id = m.add("Buy milk").unwrap().unwrap();
        m.start_edit(id, "Buy milk");
        m.set_editing_text("   ");
        assert!(m.save_edit().unwrap());
        assert_eq!(m.get(id).unwrap().text, "");
        assert_eq!(m.tasks().len(), 1);
    }

    #[test]
    fn test_save_edit_when_idle() {
        let mut m = manager();
        m.add("a").unwrap();
        assert!(!m.save_edit().unwrap());
    }

    #[test]
    fn test_cancel_edit() {
        let mut m = manager();
        let id = m.add("Buy milk").unwrap().unwrap();
        m.start_edit(id, "Buy milk");
        m.set_editing_text("Buy eggs");
        m.cancel_edit();
        assert_eq!(m.get(id).unwrap().text, "Buy milk");
        assert_eq!(m.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_start_edit_switches_without_saving() {
        let mut m = manager();
        let a = m.add("a").unwrap().unwrap();
        let b = m.add("b").unwrap().unwrap();
        m.start_edit(a, "a");
        m.set_editing_text("changed");
        m.start_edit(b, "b");
        assert_eq!(
            m.edit_state(),
            &EditState::Editing {
                id: b,
                text: "b".to_string()
            }
        );
        assert_eq!(m.get(a).unwrap().text, "a");
    }

    #[test]
    fn test_set_editing_text_ignored_when_idle() {
        let mut m = manager();
        m.set_editing_text("x");
        assert_eq!(m.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_row_mode_and_actions() {
        let mut m = manager();
        let a = m.add("a").unwrap().unwrap();
        let b = m.add("b").unwrap().unwrap();
        assert!(m.actions_visible());
        assert_eq!(m.row_mode(a), RowMode::Display);

        m.start_edit(a, "a");
        assert_eq!(m.row_mode(a), RowMode::Edit);
        assert_eq!(m.row_mode(b), RowMode::Display);
        assert!(!m.actions_visible());

        m.cancel_edit();
        assert!(m.actions_visible());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String),
        Toggle(usize),
        Remove(usize),
        Edit(usize, String),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[ a-zA-Z]{0,12}".prop_map(Op::Add),
            (0usize..8).prop_map(Op::Toggle),
            (0usize..8).prop_map(Op::Remove),
            ((0usize..8), "[ a-z]{0,8}").prop_map(|(i, s)| Op::Edit(i, s)),
        ]
    }

    fn pick(m: &TaskListManager<MemoryStore>, i: usize) -> TaskId {
        if m.tasks().is_empty() {
            -1
        } else {
            m.tasks()[i % m.tasks().len()].id
        }
    }

    fn apply(m: &mut TaskListManager<MemoryStore>, op: &Op) {
        match op {
            Op::Add(text) => {
                m.add(text).unwrap();
            }
            Op::Toggle(i) => {
                let id = pick(m, *i);
                m.toggle(id).unwrap();
            }
            Op::Remove(i) => {
                let id = pick(m, *i);
                m.remove(id).unwrap();
            }
            Op::Edit(i, text) => {
                let id = pick(m, *i);
                m.start_edit(id, "");
                m.set_editing_text(text);
                m.save_edit().unwrap();
            }
        }
    }

    proptest! {
        #[test]
        fn prop_blank_add_is_rejected(ws in "[ \t\n]{0,10}") {
            let mut m = manager();
            m.add("seed").unwrap();
            let before = m.tasks().to_vec();
            prop_assert_eq!(m.add(&ws).unwrap(), None);
            prop_assert_eq!(m.tasks(), &before[..]);
        }

        #[test]
        fn prop_add_appends_trimmed(text in "[ ]{0,3}[a-z][a-z ]{0,10}") {
            let mut m = manager();
            m.add("seed").unwrap();
            let before = m.tasks().len();
            let id = m.add(&text).unwrap().unwrap();
            prop_assert_eq!(m.tasks().len(), before + 1);
            let last = m.tasks().last().unwrap();
            prop_assert_eq!(last.id, id);
            prop_assert_eq!(last.text.as_str(), text.trim());
            prop_assert!(!last.completed);
        }

        #[test]
        fn prop_ops_keep_ids_unique_and_round_trip(ops in prop::collection::vec(op(), 0..40)) {
            let mut m = manager();
            for op in &ops {
                apply(&mut m, op);
            }
            let mut ids: Vec<TaskId> = m.tasks().iter().map(|t| t.id).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), m.tasks().len());

            let reloaded = TaskListManager::load(m.store().clone());
            prop_assert_eq!(reloaded.tasks(), m.tasks());
        }

        #[test]
        fn prop_toggle_twice_restores(ops in prop::collection::vec(op(), 1..20), pick in 0usize..8) {
            let mut m = manager();
            for op in &ops {
                apply(&mut m, op);
            }
            if let Some(task) = m.tasks().get(pick % m.tasks().len().max(1)).cloned() {
                m.toggle(task.id).unwrap();
                m.toggle(task.id).unwrap();
                prop_assert_eq!(m.get(task.id).unwrap(), &task);
            }
        }

        #[test]
        fn prop_visible_is_ordered_subset(
            ops in prop::collection::vec(op(), 0..30),
            category in prop_oneof![
                Just(CategoryFilter::All),
                Just(CategoryFilter::Complete),
                Just(CategoryFilter::Incomplete),
            ],
            search in "[a-zA-Z]{0,2}",
        ) {
            let mut m = manager();
            for op in &ops {
                apply(&mut m, op);
            }
            let positions: Vec<usize> = m
                .compute_visible(&FilterState::new(category, search))
                .iter()
                .map(|v| m.tasks().iter().position(|t| t.id == v.id).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

            let everything: Vec<&Task> = m.tasks().iter().collect();
            prop_assert_eq!(m.compute_visible(&all()), everything);
        }
    }
}
