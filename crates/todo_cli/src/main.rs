//! Todo service entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and `TODO_*` environment variables.
//! - Start logging, run migrations, then serve HTTP until Ctrl-C.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use todo_core::{core_version, default_log_level, init_logging, TodoStore, SERVICE_NAME};
use tokio::net::TcpListener;

const DEFAULT_DB_FILE_NAME: &str = "todo_service.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "todo_service_logs";

/// Single-resource todo REST service backed by SQLite.
#[derive(Parser, Debug)]
#[command(name = "todo-service", version, about, long_about = None)]
struct Args {
    /// SQLite database file.
    #[arg(long, env = "TODO_DB_PATH", default_value_os_t = default_db_path())]
    db_path: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "TODO_BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// One of trace|debug|info|warn|error.
    #[arg(long, env = "TODO_LOG_LEVEL", default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "TODO_LOG_DIR", default_value_os_t = default_log_dir())]
    log_dir: PathBuf,
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, &args.log_dir.to_string_lossy())
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    info!(
        "event=app_start module=cli status=ok service={} version={}",
        SERVICE_NAME,
        core_version()
    );

    let store = TodoStore::new(args.db_path);
    store
        .init()
        .with_context(|| format!("failed to open database {}", store.db_path().display()))?;

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    todo_api::serve(listener, todo_api::create_router(store))
        .await
        .context("server terminated with an error")
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "todo-service",
            "--db-path",
            "/var/lib/todo/todos.sqlite3",
            "--bind",
            "0.0.0.0:9000",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.db_path.to_str(), Some("/var/lib/todo/todos.sqlite3"));
        assert_eq!(args.bind.port(), 9000);
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn rejects_malformed_bind_address() {
        assert!(Args::try_parse_from(["todo-service", "--bind", "localhost"]).is_err());
    }
}
