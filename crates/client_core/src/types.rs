use std::{collections::HashMap, time::Duration, time::Instant};

use shared::domain::{remaining_count, TodoId, TodoRecord};

/// A row of the client-held list, tagged by whether the store has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoEntry {
    /// Applied locally while the create call is in flight; carries a
    /// provisional negative id.
    Optimistic(TodoRecord),
    /// Returned by the backend.
    Confirmed(TodoRecord),
}

impl TodoEntry {
    pub fn record(&self) -> &TodoRecord {
        match self {
            Self::Optimistic(record) | Self::Confirmed(record) => record,
        }
    }

    pub(crate) fn record_mut(&mut self) -> &mut TodoRecord {
        match self {
            Self::Optimistic(record) | Self::Confirmed(record) => record,
        }
    }

    pub fn id(&self) -> TodoId {
        self.record().id
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// How long a deleted row stays rendered before it leaves the list.
    pub removal_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            removal_delay: Duration::from_millis(300),
        }
    }
}

/// Point-in-time copy of the controller state handed to presentation code.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub entries: Vec<TodoEntry>,
    pub pending_removal: HashMap<TodoId, Instant>,
    pub last_error: Option<String>,
}

impl ListSnapshot {
    pub fn remaining_count(&self) -> usize {
        remaining_count(self.entries.iter().map(TodoEntry::record))
    }

    pub fn is_pending_removal(&self, id: TodoId) -> bool {
        self.pending_removal.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<TodoId> {
        self.entries.iter().map(TodoEntry::id).collect()
    }

    pub fn find(&self, id: TodoId) -> Option<&TodoEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    ListChanged(ListSnapshot),
    RemovalStarted { id: TodoId, delay: Duration },
    SyncFailed(String),
}
