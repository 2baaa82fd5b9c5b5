//! Backend commands queued from UI to backend worker.

use shared::domain::TodoId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Add {
        content: String,
    },
    Toggle {
        id: TodoId,
    },
    Delete {
        id: TodoId,
    },
    Reorder {
        source: TodoId,
        destination: TodoId,
    },
    Refresh,
    ClearError,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Toggle { .. } => "toggle",
            Self::Delete { .. } => "delete",
            Self::Reorder { .. } => "reorder",
            Self::Refresh => "refresh",
            Self::ClearError => "clear_error",
        }
    }
}
