use serde::{Deserialize, Serialize};

use crate::domain::TodoId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    pub id: TodoId,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodoResponse {
    pub changes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTodoRequest {
    pub id: TodoId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTodoResponse {
    pub success: bool,
    #[serde(default)]
    pub changes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTodosRequest {
    pub source_id: TodoId,
    pub destination_id: TodoId,
}

pub fn todos_route() -> &'static str {
    "/todos"
}

pub fn todos_order_route() -> &'static str {
    "/todos/order"
}
