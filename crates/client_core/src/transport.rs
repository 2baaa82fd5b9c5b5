use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{TodoId, TodoRecord},
    error::{ApiError, ErrorCode},
    protocol::{
        CreateTodoRequest, DeleteTodoRequest, DeleteTodoResponse, ReorderTodosRequest,
        UpdateTodoRequest, UpdateTodoResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::{error::ClientError, TodoBackend};

/// Talks to the todo server's `/todos` collection.
pub struct HttpTodoBackend {
    http: Client,
    todos_url: Url,
    order_url: Url,
}

impl HttpTodoBackend {
    /// `server_url` may carry a path prefix such as `http://host/api`.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(server_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            todos_url: base.join("todos")?,
            order_url: base.join("todos/order")?,
        })
    }

    pub fn todos_url(&self) -> &Url {
        &self.todos_url
    }
}

#[async_trait]
impl TodoBackend for HttpTodoBackend {
    async fn list(&self) -> Result<Vec<TodoRecord>, ClientError> {
        let response = self.http.get(self.todos_url.clone()).send().await?;
        decode(response).await
    }

    async fn create(&self, content: &str) -> Result<TodoRecord, ClientError> {
        let response = self
            .http
            .post(self.todos_url.clone())
            .json(&CreateTodoRequest {
                content: content.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn update(&self, id: TodoId, completed: bool) -> Result<(), ClientError> {
        let response = self
            .http
            .put(self.todos_url.clone())
            .json(&UpdateTodoRequest { id, completed })
            .send()
            .await?;
        let body: UpdateTodoResponse = decode(response).await?;
        debug!(todo_id = id.0, changes = body.changes, "updated todo");
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.todos_url.clone())
            .json(&DeleteTodoRequest { id })
            .send()
            .await?;
        let body: DeleteTodoResponse = decode(response).await?;
        debug!(todo_id = id.0, changes = body.changes, "deleted todo");
        Ok(())
    }

    async fn reorder(&self, source: TodoId, destination: TodoId) -> Result<(), ClientError> {
        let response = self
            .http
            .put(self.order_url.clone())
            .json(&ReorderTodosRequest {
                source_id: source,
                destination_id: destination,
            })
            .send()
            .await?;
        let _: Vec<TodoRecord> = decode(response).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let err = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
        ApiError::new(
            code_for_status(status),
            format!("HTTP {status}: {}", body.trim()),
        )
    });
    Err(ClientError::Api(err.into()))
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => ErrorCode::Validation,
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::SERVICE_UNAVAILABLE => ErrorCode::StoreUnavailable,
        _ => ErrorCode::Internal,
    }
}
