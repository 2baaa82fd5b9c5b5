use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{move_item, TodoId, TodoRecord},
    error::{ApiException, ErrorCode},
};
use tokio::sync::Mutex;

use crate::{error::ClientError, TodoBackend};

/// Session-only backend: nothing survives the process. Ids come from the
/// wall clock in milliseconds, bumped past the previous id when two
/// creations land in the same tick.
#[derive(Default)]
pub struct MemoryTodoBackend {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    todos: Vec<TodoRecord>,
    last_id: i64,
}

impl MemoryTodoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TodoRecord>) -> Self {
        let last_id = records.iter().map(|record| record.id.0).max().unwrap_or(0);
        Self {
            inner: Mutex::new(MemoryState {
                todos: records,
                last_id,
            }),
        }
    }
}

#[async_trait]
impl TodoBackend for MemoryTodoBackend {
    async fn list(&self) -> Result<Vec<TodoRecord>, ClientError> {
        Ok(self.inner.lock().await.todos.clone())
    }

    async fn create(&self, content: &str) -> Result<TodoRecord, ClientError> {
        if content.trim().is_empty() {
            return Err(ClientError::EmptyContent);
        }
        let now = Utc::now();
        let mut state = self.inner.lock().await;
        let id = now.timestamp_millis().max(state.last_id + 1);
        state.last_id = id;
        let record = TodoRecord {
            id: TodoId(id),
            content: content.to_string(),
            completed: false,
            created_at: now.timestamp(),
        };
        state.todos.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: TodoId, completed: bool) -> Result<(), ClientError> {
        let mut state = self.inner.lock().await;
        if let Some(record) = state.todos.iter_mut().find(|record| record.id == id) {
            record.completed = completed;
        }
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        self.inner.lock().await.todos.retain(|record| record.id != id);
        Ok(())
    }

    async fn reorder(&self, source: TodoId, destination: TodoId) -> Result<(), ClientError> {
        let mut state = self.inner.lock().await;
        let from = state.todos.iter().position(|record| record.id == source);
        let to = state.todos.iter().position(|record| record.id == destination);
        let (Some(from), Some(to)) = (from, to) else {
            return Err(ApiException::new(
                ErrorCode::NotFound,
                format!("todo {source} or {destination} not found"),
            )
            .into());
        };
        move_item(&mut state.todos, from, to);
        Ok(())
    }
}
