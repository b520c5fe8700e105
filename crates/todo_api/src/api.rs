//! HTTP handlers for the todo use-cases.
//!
//! # Responsibility
//! - Translate extracted requests into `TodoService` calls.
//! - Run every call as one unit of work on the blocking pool.
//! - Wrap results in the response envelope.
//!
//! # Invariants
//! - Handlers hold no state besides the cloneable `TodoStore`.
//! - Extraction failures (bad JSON, non-numeric id) are 400 envelopes,
//!   never framework-default bodies.

use crate::envelope::{ApiError, ApiResponse};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use todo_core::{
    core_version, CreateTodoInput, ServiceResult, SqliteTodoService, Todo, TodoId, TodoStore,
    UpdateTodoInput, SERVICE_NAME,
};

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    store: TodoStore,
}

impl AppState {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

/// Query parameters for `GET /api/todos`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// `all|completed|pending`; absent means `all`.
    pub status: Option<String>,
}

/// Payload for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

/// Payload for bulk deletes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeletedCount {
    pub deleted_count: usize,
}

/// GET /
pub async fn service_info() -> ApiResponse<ServiceInfo> {
    ApiResponse::ok(
        "todo service running",
        ServiceInfo {
            name: SERVICE_NAME.to_string(),
            version: core_version().to_string(),
        },
    )
}

/// GET /api/todos?status=...
pub async fn list_todos(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<Todo>> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let todos = run_unit(&state, "todo_list", move |service| {
        service.list_todos(params.status.as_deref())
    })
    .await?;
    Ok(ApiResponse::ok("success", todos))
}

/// GET /api/todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<TodoId>, PathRejection>,
) -> ApiResult<Todo> {
    let id = todo_id(id)?;
    match run_unit(&state, "todo_get", move |service| service.get_todo(id)).await? {
        Some(todo) => Ok(ApiResponse::ok("success", todo)),
        None => Err(ApiError::not_found(id)),
    }
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodoInput>, JsonRejection>,
) -> ApiResult<Todo> {
    let Json(input) = body.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let todo = run_unit(&state, "todo_create", move |service| {
        service.create_todo(&input)
    })
    .await?;
    Ok(ApiResponse::created("todo created", todo))
}

/// PUT /api/todos/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<TodoId>, PathRejection>,
    body: Result<Json<UpdateTodoInput>, JsonRejection>,
) -> ApiResult<Todo> {
    let id = todo_id(id)?;
    let Json(input) = body.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let todo = run_unit(&state, "todo_update", move |service| {
        service.update_todo(id, &input)
    })
    .await?;
    Ok(ApiResponse::ok("todo updated", todo))
}

/// PATCH /api/todos/{id}/toggle
pub async fn toggle_todo(
    State(state): State<AppState>,
    id: Result<Path<TodoId>, PathRejection>,
) -> ApiResult<Todo> {
    let id = todo_id(id)?;
    let todo = run_unit(&state, "todo_toggle", move |service| service.toggle_todo(id)).await?;
    Ok(ApiResponse::ok("todo status toggled", todo))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<TodoId>, PathRejection>,
) -> ApiResult<()> {
    let id = todo_id(id)?;
    run_unit(&state, "todo_delete", move |service| service.delete_todo(id)).await?;
    Ok(ApiResponse::empty(StatusCode::OK, "todo deleted"))
}

/// DELETE /api/todos/completed
pub async fn delete_completed_todos(State(state): State<AppState>) -> ApiResult<DeletedCount> {
    let deleted_count = run_unit(&state, "todo_delete_completed", |service| {
        service.delete_completed()
    })
    .await?;
    Ok(ApiResponse::ok(
        "completed todos deleted",
        DeletedCount { deleted_count },
    ))
}

/// DELETE /api/todos/all
pub async fn delete_all_todos(State(state): State<AppState>) -> ApiResult<DeletedCount> {
    let deleted_count = run_unit(&state, "todo_delete_all", |service| service.delete_all()).await?;
    Ok(ApiResponse::ok("all todos deleted", DeletedCount { deleted_count }))
}

/// Fallback for unknown paths.
pub async fn route_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "route not found")
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

fn todo_id(id: Result<Path<TodoId>, PathRejection>) -> Result<TodoId, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|err| ApiError::bad_request(format!("invalid todo id: {}", err.body_text())))
}

async fn run_unit<T, F>(state: &AppState, operation: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SqliteTodoService<'_>) -> ServiceResult<T> + Send + 'static,
{
    let store = state.store.clone();
    let joined = tokio::task::spawn_blocking(move || store.with_service(f)).await;

    match joined {
        Ok(result) => result.map_err(|err| ApiError::from_service(operation, err)),
        Err(err) => {
            error!(
                "event={} module=api status=error error_code=worker_failed error={}",
                operation, err
            );
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error",
            ))
        }
    }
}
