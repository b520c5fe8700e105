use todo_core::{CreateTodoInput, Patch, TodoServiceError, TodoStore, UpdateTodoInput};

fn temp_store() -> (tempfile::TempDir, TodoStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = TodoStore::new(dir.path().join("todos.sqlite3"));
    store.init().unwrap();
    (dir, store)
}

#[test]
fn committed_work_is_visible_to_later_units() {
    let (_dir, store) = temp_store();

    let created = store
        .with_service(|service| service.create_todo(&CreateTodoInput::new("buy milk")))
        .unwrap();

    let loaded = store
        .with_service(|service| service.get_todo(created.id))
        .unwrap();
    assert_eq!(loaded, Some(created));
}

#[test]
fn failed_unit_rolls_back_its_writes() {
    let (_dir, store) = temp_store();

    let result = store.with_service(|service| {
        let todo = service.create_todo(&CreateTodoInput::new("half done"))?;
        let invalid = UpdateTodoInput {
            priority: Patch::Value("someday".to_string()),
            ..UpdateTodoInput::default()
        };
        service.update_todo(todo.id, &invalid)
    });
    assert!(matches!(result, Err(TodoServiceError::InvalidInput(_))));

    let remaining = store
        .with_service(|service| service.list_todos(None))
        .unwrap();
    assert!(remaining.is_empty());
}

#[test]
fn unreachable_database_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = TodoStore::new(dir.path().join("missing").join("todos.sqlite3"));

    let result = store.with_service(|service| service.list_todos(None));
    assert!(matches!(
        result,
        Err(TodoServiceError::StorageUnavailable(_))
    ));
}

#[test]
fn store_reports_its_database_path() {
    let (dir, store) = temp_store();

    assert_eq!(store.db_path(), dir.path().join("todos.sqlite3").as_path());
    assert!(store.db_path().exists());
}
