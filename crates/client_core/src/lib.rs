use std::{collections::HashMap, sync::Arc, time::Instant};

use async_trait::async_trait;
use chrono::Utc;
use shared::domain::{move_item, remaining_count, TodoId, TodoRecord};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod error;
pub mod memory;
pub mod transport;
pub mod types;

pub use error::ClientError;
pub use memory::MemoryTodoBackend;
pub use transport::HttpTodoBackend;
pub use types::{ClientEvent, ControllerConfig, ListSnapshot, TodoEntry};

/// Remote side of the list: a todo server over HTTP or an in-process store.
#[async_trait]
pub trait TodoBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<TodoRecord>, ClientError>;
    async fn create(&self, content: &str) -> Result<TodoRecord, ClientError>;
    async fn update(&self, id: TodoId, completed: bool) -> Result<(), ClientError>;
    async fn delete(&self, id: TodoId) -> Result<(), ClientError>;
    async fn reorder(&self, source: TodoId, destination: TodoId) -> Result<(), ClientError>;
}

/// Hands out provisional ids for optimistic rows. They are negative and
/// strictly decreasing so they never meet a store id or each other.
#[derive(Debug, Default)]
struct ProvisionalIds {
    last: i64,
}

impl ProvisionalIds {
    fn next(&mut self) -> TodoId {
        let candidate = -Utc::now().timestamp_millis();
        let id = if candidate < self.last {
            candidate
        } else {
            self.last - 1
        };
        self.last = id;
        TodoId(id)
    }
}

#[derive(Default)]
struct ListState {
    entries: Vec<TodoEntry>,
    pending_removal: HashMap<TodoId, Instant>,
    provisional_ids: ProvisionalIds,
    last_error: Option<String>,
}

impl ListState {
    fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            entries: self.entries.clone(),
            pending_removal: self.pending_removal.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn position(&self, id: TodoId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    /// Toggle, delete and reorder only act on confirmed rows that are not
    /// already on their way out.
    fn ensure_actionable(&self, id: TodoId) -> Result<usize, ClientError> {
        if self.pending_removal.contains_key(&id) {
            return Err(ClientError::PendingRemoval(id));
        }
        let index = self.position(id).ok_or(ClientError::UnknownTodo(id))?;
        if !self.entries[index].is_confirmed() {
            return Err(ClientError::Unconfirmed(id));
        }
        Ok(index)
    }

    /// Replaces confirmed rows with `records`; optimistic rows still waiting
    /// on their create call stay at the end.
    fn replace_confirmed(&mut self, records: Vec<TodoRecord>) {
        let optimistic: Vec<TodoEntry> = self
            .entries
            .drain(..)
            .filter(|entry| !entry.is_confirmed())
            .collect();
        self.entries = records.into_iter().map(TodoEntry::Confirmed).collect();
        self.entries.extend(optimistic);
    }
}

/// Client-held ordered todo list and the intents that mutate it.
///
/// Every mutation is applied locally first, sent to the backend, and then
/// reconciled by refetching the whole list. The state lock is never held
/// across a backend call or the removal delay.
pub struct TodoListController {
    backend: Arc<dyn TodoBackend>,
    config: ControllerConfig,
    inner: Mutex<ListState>,
    events: broadcast::Sender<ClientEvent>,
}

impl TodoListController {
    pub fn new(backend: Arc<dyn TodoBackend>, config: ControllerConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            config,
            inner: Mutex::new(ListState::default()),
            events,
        })
    }

    pub fn in_memory(config: ControllerConfig) -> Arc<Self> {
        Self::new(Arc::new(MemoryTodoBackend::new()), config)
    }

    pub fn over_http(server_url: &str, config: ControllerConfig) -> Result<Arc<Self>, ClientError> {
        let backend = HttpTodoBackend::new(server_url)?;
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn remaining_count(&self) -> usize {
        let state = self.inner.lock().await;
        remaining_count(state.entries.iter().map(TodoEntry::record))
    }

    pub async fn clear_error(&self) {
        let mut state = self.inner.lock().await;
        if state.last_error.take().is_some() {
            self.publish(&state);
        }
    }

    /// Replaces local state with the backend's full list.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        match self.backend.list().await {
            Ok(records) => {
                let mut state = self.inner.lock().await;
                debug!(count = records.len(), "refreshed todo list");
                state.replace_confirmed(records);
                self.publish(&state);
                Ok(())
            }
            Err(err) => {
                let mut state = self.inner.lock().await;
                self.record_failure(&mut state, "refresh", &err);
                Err(err)
            }
        }
    }

    /// Appends `content` (trimmed) and creates it on the backend. Blank input
    /// is refused without touching the list.
    pub async fn add(&self, content: &str) -> Result<TodoRecord, ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::EmptyContent);
        }

        let provisional_id = {
            let mut state = self.inner.lock().await;
            let id = state.provisional_ids.next();
            state.entries.push(TodoEntry::Optimistic(TodoRecord {
                id,
                content: content.to_string(),
                completed: false,
                created_at: Utc::now().timestamp(),
            }));
            self.publish(&state);
            id
        };

        let created = match self.backend.create(content).await {
            Ok(created) => created,
            Err(err) => {
                let mut state = self.inner.lock().await;
                state.entries.retain(|entry| entry.id() != provisional_id);
                self.record_failure(&mut state, "add", &err);
                return Err(err);
            }
        };

        {
            let mut state = self.inner.lock().await;
            // A refresh that ran while the create was in flight may already
            // have brought the new row in.
            if state.position(created.id).is_some() {
                state.entries.retain(|entry| entry.id() != provisional_id);
            } else {
                match state.position(provisional_id) {
                    Some(index) => state.entries[index] = TodoEntry::Confirmed(created.clone()),
                    None => state.entries.push(TodoEntry::Confirmed(created.clone())),
                }
            }
            self.publish(&state);
        }
        info!(todo_id = created.id.0, "added todo");

        let _ = self.refresh().await;
        Ok(created)
    }

    /// Flips the completed flag; returns the new value.
    pub async fn toggle(&self, id: TodoId) -> Result<bool, ClientError> {
        let completed = {
            let mut state = self.inner.lock().await;
            let index = state.ensure_actionable(id)?;
            let record = state.entries[index].record_mut();
            record.completed = !record.completed;
            let completed = record.completed;
            self.publish(&state);
            completed
        };

        if let Err(err) = self.backend.update(id, completed).await {
            let mut state = self.inner.lock().await;
            if let Some(index) = state.position(id) {
                state.entries[index].record_mut().completed = !completed;
            }
            self.record_failure(&mut state, "toggle", &err);
            return Err(err);
        }

        let _ = self.refresh().await;
        Ok(completed)
    }

    /// Marks `id` pending removal, waits out the removal delay so the exit
    /// animation can play, then drops it locally and on the backend.
    ///
    /// There is no cancellation: once started the removal runs to the end.
    pub async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        {
            let mut state = self.inner.lock().await;
            state.ensure_actionable(id)?;
            state
                .pending_removal
                .insert(id, tokio::time::Instant::now().into_std());
            let _ = self.events.send(ClientEvent::RemovalStarted {
                id,
                delay: self.config.removal_delay,
            });
            self.publish(&state);
        }

        tokio::time::sleep(self.config.removal_delay).await;

        {
            let mut state = self.inner.lock().await;
            state.entries.retain(|entry| entry.id() != id);
            self.publish(&state);
        }

        let result = self.backend.delete(id).await;
        if let Err(err) = result {
            {
                let mut state = self.inner.lock().await;
                state.pending_removal.remove(&id);
                self.record_failure(&mut state, "delete", &err);
            }
            let _ = self.refresh().await;
            return Err(err);
        }
        info!(todo_id = id.0, "deleted todo");

        let _ = self.refresh().await;
        let mut state = self.inner.lock().await;
        state.pending_removal.remove(&id);
        self.publish(&state);
        Ok(())
    }

    /// Moves `source` to the slot held by `destination`, shifting the rows in
    /// between by one.
    pub async fn reorder(&self, source: TodoId, destination: TodoId) -> Result<(), ClientError> {
        let from = {
            let mut state = self.inner.lock().await;
            let from = state.ensure_actionable(source)?;
            let to = state.ensure_actionable(destination)?;
            if from == to {
                return Ok(());
            }
            move_item(&mut state.entries, from, to);
            self.publish(&state);
            from
        };

        if let Err(err) = self.backend.reorder(source, destination).await {
            let mut state = self.inner.lock().await;
            if let Some(current) = state.position(source) {
                let back_to = from.min(state.entries.len() - 1);
                move_item(&mut state.entries, current, back_to);
            }
            self.record_failure(&mut state, "reorder", &err);
            return Err(err);
        }

        let _ = self.refresh().await;
        Ok(())
    }

    fn publish(&self, state: &ListState) {
        let _ = self.events.send(ClientEvent::ListChanged(state.snapshot()));
    }

    fn record_failure(&self, state: &mut ListState, intent: &str, err: &ClientError) {
        warn!(intent, error = %err, "todo sync failed");
        let message = format!("{intent} failed: {err}");
        state.last_error = Some(message.clone());
        let _ = self.events.send(ClientEvent::SyncFailed(message));
        self.publish(state);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
