use shared::{
    domain::{TodoId, TodoRecord},
    error::{ApiError, ErrorCode},
    protocol::{DeleteTodoResponse, UpdateTodoResponse},
};
use storage::Storage;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

impl ApiContext {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

pub async fn list_todos(ctx: &ApiContext) -> Result<Vec<TodoRecord>, ApiError> {
    ctx.storage.list_todos().await.map_err(internal)
}

pub async fn create_todo(ctx: &ApiContext, content: &str) -> Result<TodoRecord, ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "todo content must not be empty",
        ));
    }
    let record = ctx.storage.insert_todo(content).await.map_err(internal)?;
    info!(todo_id = record.id.0, "created todo");
    Ok(record)
}

/// Missing ids are not an error; `changes` is zero in that case.
pub async fn update_todo(
    ctx: &ApiContext,
    id: TodoId,
    completed: bool,
) -> Result<UpdateTodoResponse, ApiError> {
    let changes = ctx
        .storage
        .set_completed(id, completed)
        .await
        .map_err(internal)?;
    if changes == 0 {
        debug!(todo_id = id.0, "update for unknown todo ignored");
    }
    Ok(UpdateTodoResponse { changes })
}

pub async fn delete_todo(ctx: &ApiContext, id: TodoId) -> Result<DeleteTodoResponse, ApiError> {
    let changes = ctx.storage.delete_todo(id).await.map_err(internal)?;
    if changes == 0 {
        debug!(todo_id = id.0, "delete for unknown todo ignored");
    } else {
        info!(todo_id = id.0, "deleted todo");
    }
    Ok(DeleteTodoResponse {
        success: true,
        changes,
    })
}

pub async fn reorder_todos(
    ctx: &ApiContext,
    source_id: TodoId,
    destination_id: TodoId,
) -> Result<Vec<TodoRecord>, ApiError> {
    let moved = ctx
        .storage
        .move_todo(source_id, destination_id)
        .await
        .map_err(internal)?;
    if !moved {
        return Err(ApiError::new(
            ErrorCode::NotFound,
            format!("todo {source_id} or {destination_id} not found"),
        ));
    }
    list_todos(ctx).await
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext::new(storage)
    }

    #[tokio::test]
    async fn create_then_list_round_trips_one_record() {
        let ctx = setup().await;
        create_todo(&ctx, "Buy milk").await.expect("create");

        let todos = list_todos(&ctx).await.expect("list");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].content, "Buy milk");
        assert!(!todos[0].completed);
    }

    #[tokio::test]
    async fn whitespace_content_is_a_validation_error() {
        let ctx = setup().await;
        let err = create_todo(&ctx, "   ").await.expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::Validation));
        assert!(list_todos(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_ids_are_noops() {
        let ctx = setup().await;
        let update = update_todo(&ctx, TodoId(77), true).await.expect("update");
        assert_eq!(update.changes, 0);

        let delete = delete_todo(&ctx, TodoId(77)).await.expect("delete");
        assert!(delete.success);
        assert_eq!(delete.changes, 0);
    }

    #[tokio::test]
    async fn update_sets_completed_flag() {
        let ctx = setup().await;
        let record = create_todo(&ctx, "walk").await.expect("create");
        let update = update_todo(&ctx, record.id, true).await.expect("update");
        assert_eq!(update.changes, 1);

        let todos = list_todos(&ctx).await.expect("list");
        assert!(todos[0].completed);
    }

    #[tokio::test]
    async fn concurrent_creates_each_return_their_own_record() {
        let ctx = setup().await;
        let (first, second) = tokio::join!(create_todo(&ctx, "one"), create_todo(&ctx, "two"));
        let first = first.expect("first");
        let second = second.expect("second");
        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn reorder_returns_new_order_and_rejects_unknown_ids() {
        let ctx = setup().await;
        let a = create_todo(&ctx, "a").await.expect("a");
        let b = create_todo(&ctx, "b").await.expect("b");
        let c = create_todo(&ctx, "c").await.expect("c");

        let reordered = reorder_todos(&ctx, c.id, a.id).await.expect("reorder");
        let ids: Vec<TodoId> = reordered.iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![c.id, a.id, b.id]);

        let err = reorder_todos(&ctx, a.id, TodoId(404))
            .await
            .expect_err("unknown destination");
        assert!(matches!(err.code, ErrorCode::NotFound));
    }
}
