use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, put, MethodRouter},
    Json, Router,
};
use server_api::{create_todo, delete_todo, list_todos, reorder_todos, update_todo, ApiContext};
use shared::{
    domain::TodoRecord,
    error::{ApiError, ErrorCode},
    protocol::{
        todos_order_route, todos_route, CreateTodoRequest, DeleteTodoRequest, DeleteTodoResponse,
        ReorderTodosRequest, UpdateTodoRequest, UpdateTodoResponse,
    },
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            error = %format!("{error:#}"),
            "todo store unavailable; verify the database path and permissions"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext::new(storage.clone()),
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, %database_url, "todo server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    info!("todo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for ctrl-c; shutting down");
    }
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let todos: MethodRouter<Arc<AppState>> = get(http_list_todos)
        .post(http_create_todo)
        .put(http_update_todo)
        .delete(http_delete_todo);
    let order: MethodRouter<Arc<AppState>> = put(http_reorder_todos);

    Router::new()
        .route("/healthz", get(healthz))
        .route(todos_route(), todos.clone())
        .route(todos_order_route(), order.clone())
        .route(&format!("/api{}", todos_route()), todos)
        .route(&format!("/api{}", todos_order_route()), order)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::StoreUnavailable, format!("{e:#}"))),
        )
    })?;
    Ok("ok")
}

async fn http_list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TodoRecord>>, HttpError> {
    let todos = list_todos(&state.api).await.map_err(api_failure)?;
    Ok(Json(todos))
}

async fn http_create_todo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoRecord>, HttpError> {
    let Json(req) = payload.map_err(malformed_body)?;
    let todo = create_todo(&state.api, &req.content)
        .await
        .map_err(api_failure)?;
    Ok(Json(todo))
}

async fn http_update_todo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<UpdateTodoResponse>, HttpError> {
    let Json(req) = payload.map_err(malformed_body)?;
    let response = update_todo(&state.api, req.id, req.completed)
        .await
        .map_err(api_failure)?;
    Ok(Json(response))
}

async fn http_delete_todo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteTodoRequest>, JsonRejection>,
) -> Result<Json<DeleteTodoResponse>, HttpError> {
    let Json(req) = payload.map_err(malformed_body)?;
    let response = delete_todo(&state.api, req.id)
        .await
        .map_err(api_failure)?;
    Ok(Json(response))
}

async fn http_reorder_todos(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReorderTodosRequest>, JsonRejection>,
) -> Result<Json<Vec<TodoRecord>>, HttpError> {
    let Json(req) = payload.map_err(malformed_body)?;
    let todos = reorder_todos(&state.api, req.source_id, req.destination_id)
        .await
        .map_err(api_failure)?;
    Ok(Json(todos))
}

fn api_failure(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(code = ?err.code, message = %err.message, "todo request failed");
    }
    (status, Json(err))
}

fn malformed_body(rejection: JsonRejection) -> HttpError {
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
