use shared::{domain::TodoId, error::ApiException};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("todo content must not be empty")]
    EmptyContent,
    #[error("todo {0} is not in the list")]
    UnknownTodo(TodoId),
    #[error("todo {0} has not been confirmed by the store yet")]
    Unconfirmed(TodoId),
    #[error("todo {0} is already being removed")]
    PendingRemoval(TodoId),
    #[error("invalid server url: {0}")]
    InvalidServerUrl(#[from] url::ParseError),
    #[error("server rejected request: {0}")]
    Api(#[from] ApiException),
    #[error("network failure: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Failures talking to the backing store, as opposed to intents the
    /// controller refused locally.
    pub fn is_sync_failure(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Transport(_))
    }
}
