//! Filter types for the task list.
//!
//! Filters are transient view state: they are never persisted and never mutate the list.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Completion category shown in the list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl CategoryFilter {
    /// Next category in the All -> Complete -> Incomplete cycle.
    pub fn next(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Complete,
            CategoryFilter::Complete => CategoryFilter::Incomplete,
            CategoryFilter::Incomplete => CategoryFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Complete => "Complete",
            CategoryFilter::Incomplete => "Incomplete",
        }
    }

    fn admits(self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Complete => task.completed,
            CategoryFilter::Incomplete => !task.completed,
        }
    }
}

/// Category plus case-insensitive substring search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub text: String,
}

impl FilterState {
    pub fn new(category: CategoryFilter, text: impl Into<String>) -> Self {
        FilterState {
            category,
            text: text.into(),
        }
    }

    /// True when `task` passes both the category and the text filter.
    /// An empty text filter matches everything.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.category.admits(task) {
            return false;
        }
        if self.text.is_empty() {
            return true;
        }
        task.text
            .to_lowercase()
            .contains(&self.text.to_lowercase())
    }

    pub fn is_default(&self) -> bool {
        self.category == CategoryFilter::All && self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(text: &str, completed: bool) -> Task {
        Task {
            id: 1,
            text: text.to_string(),
            completed,
        }
    }

    #[test]
    fn test_category_admits() {
        let done = task("a", true);
        let open = task("a", false);
        assert!(FilterState::new(CategoryFilter::All, "").matches(&done));
        assert!(FilterState::new(CategoryFilter::All, "").matches(&open));
        assert!(FilterState::new(CategoryFilter::Complete, "").matches(&done));
        assert!(!FilterState::new(CategoryFilter::Complete, "").matches(&open));
        assert!(!FilterState::new(CategoryFilter::Incomplete, "").matches(&done));
        assert!(FilterState::new(CategoryFilter::Incomplete, "").matches(&open));
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let t = task("Buy Milk", false);
        assert!(FilterState::new(CategoryFilter::All, "milk").matches(&t));
        assert!(FilterState::new(CategoryFilter::All, "BUY m").matches(&t));
        assert!(!FilterState::new(CategoryFilter::All, "bread").matches(&t));
    }

    #[test]
    fn test_category_cycle() {
        let c = CategoryFilter::default();
        assert_eq!(c, CategoryFilter::All);
        assert_eq!(c.next().next().next(), CategoryFilter::All);
    }
}
