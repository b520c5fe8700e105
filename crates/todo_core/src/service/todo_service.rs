//! Todo use-case service.
//!
//! # Responsibility
//! - Mediate between validated input and the repository contract.
//! - Enforce business rules: partial updates touch only supplied fields,
//!   missing targets are `NotFound`, storage failures are never swallowed.
//!
//! # Invariants
//! - Service holds no state between calls besides the repository handle.
//! - Service layer remains storage-agnostic.
//! - Every mutation strictly advances `updated_at`.

use crate::db::DbError;
use crate::model::todo::{
    CreateTodoInput, DeletePredicate, StatusFilter, Todo, TodoId, TodoValidationError,
    UpdateTodoInput,
};
use crate::repo::todo_repo::{RepoError, TodoRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Operation-level error kinds surfaced to transport callers.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Create/update payload failed validation.
    InvalidInput(TodoValidationError),
    /// List filter is not `all|completed|pending`.
    InvalidFilter(String),
    /// Target todo does not exist.
    NotFound(TodoId),
    /// Storage engine unreachable or transaction failure.
    StorageUnavailable(RepoError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::InvalidFilter(value) => write!(
                f,
                "invalid status filter `{value}`; expected all|completed|pending"
            ),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<DbError> for TodoServiceError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for TodoServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(RepoError::from(value))
    }
}

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Use-case service over a todo repository.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists todos for a raw status filter, newest first.
    ///
    /// `None` means `all`. An empty result is not an error.
    pub fn list_todos(&self, status: Option<&str>) -> ServiceResult<Vec<Todo>> {
        let filter = match status {
            Some(raw) => StatusFilter::parse(raw)
                .ok_or_else(|| TodoServiceError::InvalidFilter(raw.to_string()))?,
            None => StatusFilter::All,
        };
        self.list_by_filter(filter)
    }

    /// Lists todos for an already parsed filter, newest first.
    pub fn list_by_filter(&self, filter: StatusFilter) -> ServiceResult<Vec<Todo>> {
        let todos = self.repo.list_todos(filter)?;
        info!(
            "event=todo_list module=service status=ok filter={} count={}",
            filter.as_str(),
            todos.len()
        );
        Ok(todos)
    }

    /// Gets one todo; a missing id yields `Ok(None)`.
    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Option<Todo>> {
        Ok(self.repo.get_todo(id)?)
    }

    /// Validates and persists a new pending todo.
    ///
    /// # Contract
    /// - `completed = false`, `created_at == updated_at == now`.
    /// - Returns the stored record including its assigned id.
    pub fn create_todo(&self, input: &CreateTodoInput) -> ServiceResult<Todo> {
        let draft = input.validate()?;
        let todo = self.repo.insert_todo(&draft, now_epoch_ms())?;
        info!(
            "event=todo_create module=service status=ok id={} priority={}",
            todo.id,
            todo.priority.as_str()
        );
        Ok(todo)
    }

    /// Applies a partial update to an existing todo.
    ///
    /// # Contract
    /// - Target existence is checked before input validation, so a missing
    ///   id is always `NotFound`.
    /// - Fields absent from `input` keep their stored values.
    /// - `updated_at` strictly increases.
    pub fn update_todo(&self, id: TodoId, input: &UpdateTodoInput) -> ServiceResult<Todo> {
        let mut todo = self.require_todo(id)?;
        let changes = input.validate()?;
        todo.apply_changes(&changes, now_epoch_ms());
        self.repo.update_todo(&todo)?;
        info!(
            "event=todo_update module=service status=ok id={} fields_changed={}",
            id,
            !changes.is_empty()
        );
        Ok(todo)
    }

    /// Flips the `completed` flag of an existing todo.
    pub fn toggle_todo(&self, id: TodoId) -> ServiceResult<Todo> {
        let mut todo = self.require_todo(id)?;
        todo.toggle_completed(now_epoch_ms());
        self.repo.update_todo(&todo)?;
        info!(
            "event=todo_toggle module=service status=ok id={} completed={}",
            id, todo.completed
        );
        Ok(todo)
    }

    /// Permanently deletes one todo.
    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        self.repo.delete_todo(id)?;
        info!("event=todo_delete module=service status=ok id={}", id);
        Ok(())
    }

    /// Deletes every todo matching `predicate` and returns the count.
    pub fn delete_by_predicate(&self, predicate: DeletePredicate) -> ServiceResult<usize> {
        let deleted = self.repo.delete_todos(predicate)?;
        info!(
            "event=todo_bulk_delete module=service status=ok predicate={} deleted_count={}",
            predicate.as_str(),
            deleted
        );
        Ok(deleted)
    }

    /// Deletes every completed todo.
    pub fn delete_completed(&self) -> ServiceResult<usize> {
        self.delete_by_predicate(DeletePredicate::Completed)
    }

    /// Deletes every todo.
    pub fn delete_all(&self) -> ServiceResult<usize> {
        self.delete_by_predicate(DeletePredicate::All)
    }

    fn require_todo(&self, id: TodoId) -> ServiceResult<Todo> {
        self.repo
            .get_todo(id)?
            .ok_or(TodoServiceError::NotFound(id))
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
