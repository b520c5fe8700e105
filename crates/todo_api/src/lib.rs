//! HTTP boundary for the todo service.
//!
//! Thin axum layer over `todo_core`: it extracts requests, runs one unit of
//! work per request, and wraps every response in the `{code, message, data}`
//! envelope.
//!
//! ## Endpoints
//!
//! - `GET /` - Service name and version
//! - `GET /api/todos?status=all|completed|pending` - List todos, newest first
//! - `POST /api/todos` - Create a todo (201)
//! - `GET /api/todos/{id}` - Get one todo
//! - `PUT /api/todos/{id}` - Partially update a todo
//! - `PATCH /api/todos/{id}/toggle` - Flip `completed`
//! - `DELETE /api/todos/{id}` - Delete one todo
//! - `DELETE /api/todos/completed` - Delete completed todos
//! - `DELETE /api/todos/all` - Delete every todo
//!
//! ## Usage
//!
//! ```rust,no_run
//! use todo_core::TodoStore;
//!
//! # async fn run() -> std::io::Result<()> {
//! let store = TodoStore::new("/tmp/todos.sqlite3");
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! todo_api::serve(listener, todo_api::create_router(store)).await
//! # }
//! ```

mod api;
mod envelope;

pub use api::{AppState, DeletedCount, ListParams, ServiceInfo};
pub use envelope::{ApiError, ApiResponse};

use axum::routing::{delete, get, patch};
use axum::Router;
use log::{error, info};
use todo_core::TodoStore;
use tokio::net::TcpListener;

/// Creates the router with every todo endpoint.
///
/// Static segments (`completed`, `all`) win over `{id}` during matching.
pub fn create_router(store: TodoStore) -> Router {
    Router::new()
        .route("/", get(api::service_info))
        .route("/api/todos", get(api::list_todos).post(api::create_todo))
        .route("/api/todos/completed", delete(api::delete_completed_todos))
        .route("/api/todos/all", delete(api::delete_all_todos))
        .route(
            "/api/todos/{id}",
            get(api::get_todo)
                .put(api::update_todo)
                .delete(api::delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(api::toggle_todo))
        .fallback(api::route_not_found)
        .method_not_allowed_fallback(api::method_not_allowed)
        .with_state(AppState::new(store))
}

/// Serves `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("event=server_start module=api status=ok addr={}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            "event=server_signal module=api status=error error={}",
            err
        );
        // Without a signal handler, run until the process is killed.
        std::future::pending::<()>().await;
    }
}
