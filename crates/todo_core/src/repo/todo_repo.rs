//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the narrow CRUD + bulk delete interface the service depends on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths report invalid persisted state as `InvalidData` instead of
//!   masking it.
//! - Lists are ordered by `created_at DESC, id DESC`.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::todo::{
    DeletePredicate, Priority, StatusFilter, Todo, TodoDraft, TodoId, TodoValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    priority,
    completed,
    due_date,
    created_at,
    updated_at
FROM todos";

const TODO_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "priority",
    "completed",
    "due_date",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    /// Connection schema does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage interface for todo items.
///
/// Implementations own id assignment; the service never invents ids.
pub trait TodoRepository {
    /// Lists rows matching `filter`, newest first.
    fn list_todos(&self, filter: StatusFilter) -> RepoResult<Vec<Todo>>;
    /// Returns `Ok(None)` for a missing id.
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    /// Persists a new pending row stamped with `now_ms` and returns it.
    fn insert_todo(&self, draft: &TodoDraft, now_ms: i64) -> RepoResult<Todo>;
    /// Replaces every mutable column of an existing row.
    fn update_todo(&self, todo: &Todo) -> RepoResult<()>;
    /// Hard-deletes one row; `NotFound` when absent.
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    /// Hard-deletes all rows matching `predicate` and returns the count.
    fn delete_todos(&self, predicate: DeletePredicate) -> RepoResult<usize>;
}

/// SQLite-backed todo repository.
///
/// Borrows the connection, so a `rusqlite::Transaction` can be passed in
/// through deref to scope every call to one transaction.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   was tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn list_todos(&self, filter: StatusFilter) -> RepoResult<Vec<Todo>> {
        let mut sql = String::from(TODO_SELECT_SQL);
        match filter {
            StatusFilter::All => {}
            StatusFilter::Completed => sql.push_str(" WHERE completed = 1"),
            StatusFilter::Pending => sql.push_str(" WHERE completed = 0"),
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }

    fn insert_todo(&self, draft: &TodoDraft, now_ms: i64) -> RepoResult<Todo> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO todos (
                title,
                description,
                priority,
                completed,
                due_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5);",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.priority.as_str(),
                draft.due_date,
                now_ms,
            ],
        )?;

        Ok(Todo {
            id: self.conn.last_insert_rowid(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            priority: draft.priority,
            completed: false,
            due_date: draft.due_date,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    fn update_todo(&self, todo: &Todo) -> RepoResult<()> {
        todo.validate()?;

        let changed = self.conn.execute(
            "UPDATE todos
             SET
                title = ?1,
                description = ?2,
                priority = ?3,
                completed = ?4,
                due_date = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                todo.title.as_str(),
                todo.description.as_deref(),
                todo.priority.as_str(),
                bool_to_int(todo.completed),
                todo.due_date,
                todo.updated_at,
                todo.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }

        Ok(())
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_todos(&self, predicate: DeletePredicate) -> RepoResult<usize> {
        let sql = match predicate {
            DeletePredicate::Completed => "DELETE FROM todos WHERE completed = 1;",
            DeletePredicate::All => "DELETE FROM todos;",
        };
        Ok(self.conn.execute(sql, [])?)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'todos';",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable("todos"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(todos);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in TODO_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id: TodoId = row.get("id")?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in todos.priority for id {id}"
        ))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed for id {id}"
            )));
        }
    };

    let todo = Todo {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        completed,
        due_date: row.get("due_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    // Bad rows are a storage fault, not caller input.
    todo.validate()
        .map_err(|err| RepoError::InvalidData(format!("{err} (todos row id {id})")))?;
    Ok(todo)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
