//! Unit-of-work wrapper around the SQLite database file.
//!
//! # Responsibility
//! - Give each operation its own connection and transaction.
//! - Commit on success; roll back and release on every error path.
//!
//! # Invariants
//! - No connection, lock, or cache outlives a single `with_service` call.
//! - Transactions start `IMMEDIATE` so read-modify-write updates cannot be
//!   interleaved by another writer.

use crate::db::{open_db, DbResult};
use crate::repo::todo_repo::SqliteTodoRepository;
use crate::service::todo_service::{ServiceResult, TodoService};
use log::debug;
use rusqlite::TransactionBehavior;
use std::path::{Path, PathBuf};

/// Service type bound to one transaction.
pub type SqliteTodoService<'conn> = TodoService<SqliteTodoRepository<'conn>>;

/// Handle to the todo database. Cheap to clone; holds only the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoStore {
    db_path: PathBuf,
}

impl TodoStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Opens the database once so migrations run before serving traffic.
    pub fn init(&self) -> DbResult<()> {
        open_db(&self.db_path).map(drop)
    }

    /// Runs `operation` inside one connection + transaction.
    ///
    /// # Errors
    /// - `StorageUnavailable` when the database cannot be opened, the
    ///   transaction cannot start, or commit fails.
    /// - Any error returned by `operation`; its writes are rolled back.
    pub fn with_service<T>(
        &self,
        operation: impl FnOnce(&SqliteTodoService<'_>) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let mut conn = open_db(&self.db_path)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = {
            let repo = SqliteTodoRepository::try_new(&tx)?;
            let service = TodoService::new(repo);
            operation(&service)
        };

        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(
                    "event=unit_of_work module=store status=rollback error={}",
                    err
                );
                Err(err)
            }
        }
    }
}
