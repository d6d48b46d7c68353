use std::path::Path;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, instrument};
use crate::core::todo::has_title;
use crate::core::{Outcome, Skip, Todo, TodoError};
use crate::storage::TodoStore;

const SELECT_TODO: &str = "SELECT id, title, COALESCE(description, '') AS description, done, created_at FROM todos";

/// Owns the pool. Requests talk to the table through a [`SqliteSession`].
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database file and ensures the schema.
    pub async fn new(path: impl AsRef<Path>, max_connections: u32) -> Result<Self, TodoError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening database");
        // A plain filename, never parsed as a URL.
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Single-connection in-memory database. The connection is never recycled,
    /// otherwise the data would vanish with it.
    pub async fn new_memory() -> Result<Self, TodoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, TodoError> {
        let storage = Self { pool };
        storage.session().create_table().await?;
        Ok(storage)
    }

    /// A session holds no connection until its first query.
    pub fn session(&self) -> SqliteSession {
        SqliteSession {
            pool: self.pool.clone(),
            conn: None,
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Request-scoped handle. The pooled connection goes back to the pool on drop.
pub struct SqliteSession {
    pool: SqlitePool,
    conn: Option<PoolConnection<Sqlite>>,
}

impl SqliteSession {
    pub fn is_acquired(&self) -> bool {
        self.conn.is_some()
    }

    async fn conn(&mut self) -> Result<&mut SqliteConnection, TodoError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                debug!("Acquiring connection");
                self.pool.acquire().await?
            }
        };
        Ok(&mut **self.conn.insert(conn))
    }
}

fn matched(rows_affected: u64) -> Outcome {
    if rows_affected == 0 {
        Outcome::Skipped(Skip::NotFound)
    } else {
        Outcome::Applied(())
    }
}

#[async_trait]
impl TodoStore for SqliteSession {
    async fn create_table(&mut self) -> Result<(), TodoError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                done INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
        )
        .execute(self.conn().await?)
        .await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn list(&mut self) -> Result<Vec<Todo>, TodoError> {
        let todos = sqlx::query_as::<_, Todo>(&format!("{SELECT_TODO} ORDER BY created_at DESC, id DESC"))
            .fetch_all(self.conn().await?)
            .await?;
        Ok(todos)
    }

    #[instrument(level = "debug", skip(self, description))]
    async fn insert(&mut self, title: &str, description: &str) -> Result<Outcome<i64>, TodoError> {
        if !has_title(title) {
            return Ok(Outcome::Skipped(Skip::EmptyTitle));
        }
        // Fixed width so text order is time order.
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let result = sqlx::query("INSERT INTO todos (title, description, created_at) VALUES (?, ?, ?)")
            .bind(title)
            .bind(description)
            .bind(created_at)
            .execute(self.conn().await?)
            .await?;
        Ok(Outcome::Applied(result.last_insert_rowid()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_by_id(&mut self, id: i64) -> Result<Option<Todo>, TodoError> {
        let todo = sqlx::query_as::<_, Todo>(&format!("{SELECT_TODO} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.conn().await?)
            .await?;
        Ok(todo)
    }

    #[instrument(level = "debug", skip(self, description))]
    async fn update(&mut self, id: i64, title: &str, description: &str) -> Result<Outcome, TodoError> {
        if !has_title(title) {
            return Ok(Outcome::Skipped(Skip::EmptyTitle));
        }
        let result = sqlx::query("UPDATE todos SET title = ?, description = ? WHERE id = ?")
            .bind(title)
            .bind(description)
            .bind(id)
            .execute(self.conn().await?)
            .await?;
        Ok(matched(result.rows_affected()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn set_done(&mut self, id: i64, done: bool) -> Result<Outcome, TodoError> {
        let result = sqlx::query("UPDATE todos SET done = ? WHERE id = ?")
            .bind(done)
            .bind(id)
            .execute(self.conn().await?)
            .await?;
        Ok(matched(result.rows_affected()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&mut self, id: i64) -> Result<Outcome, TodoError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(self.conn().await?)
            .await?;
        Ok(matched(result.rows_affected()))
    }
}
