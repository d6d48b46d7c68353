use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// Form body shared by the add and edit routes. Missing fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TodoForm {
    /// Returns `(title, description)` with surrounding whitespace removed.
    pub fn trimmed(&self) -> (&str, &str) {
        (self.title.trim(), self.description.trim())
    }
}

/// Why a write was skipped without touching the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    EmptyTitle,
    NotFound,
}

/// Result of a mutating storage call that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Applied(T),
    Skipped(Skip),
}

pub(crate) fn has_title(title: &str) -> bool {
    !title.trim().is_empty()
}
