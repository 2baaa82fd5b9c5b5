use anyhow::{Context, Result};
use shared::domain::{move_item, TodoId, TodoRecord};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

const TODO_COLUMNS: &str =
    "id, content, COALESCE(completed, 0) AS completed, COALESCE(created_at, 0) AS created_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply todo schema migrations")?;
        Ok(Self { pool })
    }

    /// Closes every pooled connection. Clones of this handle share the pool and
    /// stop working as well.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_todos(&self) -> Result<Vec<TodoRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY position ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(todo_from_row).collect()
    }

    pub async fn load_todo(&self, id: TodoId) -> Result<Option<TodoRecord>> {
        let row = sqlx::query(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(todo_from_row).transpose()
    }

    /// Inserts a todo at the end of the display order and returns the row the
    /// insert itself produced.
    pub async fn insert_todo(&self, content: &str) -> Result<TodoRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO todos (content, position)
             VALUES (?, (SELECT COALESCE(MAX(position), 0) + 1 FROM todos))
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        let record = todo_from_row(&row)?;
        debug!(todo_id = record.id.0, "inserted todo");
        Ok(record)
    }

    /// Returns the number of rows touched; zero when the id does not exist.
    pub async fn set_completed(&self, id: TodoId, completed: bool) -> Result<u64> {
        let result = sqlx::query("UPDATE todos SET completed = ? WHERE id = ?")
            .bind(completed)
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_todo(&self, id: TodoId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Moves `source` to the position currently held by `destination` and
    /// rewrites positions to be sequential. Returns `false` if either id is
    /// missing.
    pub async fn move_todo(&self, source: TodoId, destination: TodoId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let mut ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM todos ORDER BY position, id")
            .fetch_all(&mut *tx)
            .await?;

        let from = ids.iter().position(|id| *id == source.0);
        let to = ids.iter().position(|id| *id == destination.0);
        let (Some(from), Some(to)) = (from, to) else {
            return Ok(false);
        };
        if from == to {
            return Ok(true);
        }

        move_item(&mut ids, from, to);
        for (position, id) in ids.iter().enumerate() {
            sqlx::query("UPDATE todos SET position = ? WHERE id = ?")
                .bind(position as i64)
                .bind(*id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit()
            .await
            .context("failed to commit todo reorder")?;
        debug!(source = source.0, destination = destination.0, "reordered todos");
        Ok(true)
    }
}

fn todo_from_row(row: &SqliteRow) -> Result<TodoRecord> {
    Ok(TodoRecord {
        id: TodoId(row.try_get::<i64, _>("id")?),
        content: row.try_get::<String, _>("content")?,
        completed: row.try_get::<i64, _>("completed")? != 0,
        created_at: row.try_get::<i64, _>("created_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
