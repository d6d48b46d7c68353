pub mod sqlite;

use async_trait::async_trait;
use crate::core::{Outcome, Skip, Todo, TodoError};

/// CRUD over the todo table. Every write is a single auto-committed statement.
#[async_trait]
pub trait TodoStore: Send {
    async fn create_table(&mut self) -> Result<(), TodoError>;
    async fn list(&mut self) -> Result<Vec<Todo>, TodoError>;
    async fn insert(&mut self, title: &str, description: &str) -> Result<Outcome<i64>, TodoError>;
    async fn get_by_id(&mut self, id: i64) -> Result<Option<Todo>, TodoError>;
    async fn update(&mut self, id: i64, title: &str, description: &str) -> Result<Outcome, TodoError>;
    async fn set_done(&mut self, id: i64, done: bool) -> Result<Outcome, TodoError>;
    async fn delete(&mut self, id: i64) -> Result<Outcome, TodoError>;

    /// Flips `done` and reports the new value.
    async fn toggle(&mut self, id: i64) -> Result<Outcome<bool>, TodoError> {
        let Some(todo) = self.get_by_id(id).await? else {
            return Ok(Outcome::Skipped(Skip::NotFound));
        };
        let done = !todo.done;
        Ok(match self.set_done(id, done).await? {
            Outcome::Applied(()) => Outcome::Applied(done),
            Outcome::Skipped(skip) => Outcome::Skipped(skip),
        })
    }
}
