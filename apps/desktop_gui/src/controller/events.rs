//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ClientError, ListSnapshot};
use shared::{domain::TodoRecord, error::ErrorCode};

pub enum UiEvent {
    Info(String),
    ListUpdated(ListSnapshot),
    Added(TodoRecord),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Rejected,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Add,
    Toggle,
    Delete,
    Reorder,
    Sync,
    General,
}

impl UiErrorContext {
    pub fn for_command(name: &str) -> Self {
        match name {
            "add" => Self::Add,
            "toggle" => Self::Toggle,
            "delete" => Self::Delete,
            "reorder" => Self::Reorder,
            "refresh" => Self::Sync,
            _ => Self::General,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("validation")
            || message_lower.contains("empty")
            || message_lower.contains("malformed")
            || message_lower.contains("invalid")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("already being removed")
            || message_lower.contains("not been confirmed")
            || message_lower.contains("not in the list")
        {
            UiErrorCategory::Rejected
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("offline")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnected")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::EmptyContent | ClientError::InvalidServerUrl(_) => {
                UiErrorCategory::Validation
            }
            ClientError::UnknownTodo(_)
            | ClientError::Unconfirmed(_)
            | ClientError::PendingRemoval(_) => UiErrorCategory::Rejected,
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Api(api) => match api.code {
                ErrorCode::StoreUnavailable => UiErrorCategory::Transport,
                ErrorCode::Validation => UiErrorCategory::Validation,
                ErrorCode::NotFound | ErrorCode::Internal => UiErrorCategory::Unknown,
            },
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rejected intents are expected races with the removal animation and
    /// are not worth a banner.
    pub fn is_banner_worthy(&self) -> bool {
        self.category != UiErrorCategory::Rejected
    }
}
