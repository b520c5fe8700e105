//! Core domain logic for the todo service.
//! This crate is the single source of truth for validation and business
//! invariants; transport crates only translate requests and responses.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{
    CreateTodoInput, DeletePredicate, Patch, Priority, StatusFilter, Todo, TodoChanges, TodoDraft,
    TodoId, TodoValidationError, UpdateTodoInput,
};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use service::todo_service::{now_epoch_ms, ServiceResult, TodoService, TodoServiceError};
pub use store::{SqliteTodoService, TodoStore};

/// Service name reported by the info endpoint.
pub const SERVICE_NAME: &str = "todo-service";

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
