//! Service behavior against an in-memory repository, independent of SQLite.

use std::cell::{Cell, RefCell};
use todo_core::{
    CreateTodoInput, DeletePredicate, Patch, RepoError, RepoResult, StatusFilter, Todo, TodoDraft,
    TodoId, TodoRepository, TodoService, TodoServiceError, UpdateTodoInput,
};

#[derive(Default)]
struct MemoryRepo {
    rows: RefCell<Vec<Todo>>,
    last_id: Cell<TodoId>,
    offline: Cell<bool>,
}

impl MemoryRepo {
    fn check_online(&self) -> RepoResult<()> {
        if self.offline.get() {
            return Err(RepoError::InvalidData("engine offline".to_string()));
        }
        Ok(())
    }
}

impl TodoRepository for &MemoryRepo {
    fn list_todos(&self, filter: StatusFilter) -> RepoResult<Vec<Todo>> {
        self.check_online()?;
        let mut rows: Vec<Todo> = self
            .rows
            .borrow()
            .iter()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        self.check_online()?;
        Ok(self.rows.borrow().iter().find(|todo| todo.id == id).cloned())
    }

    fn insert_todo(&self, draft: &TodoDraft, now_ms: i64) -> RepoResult<Todo> {
        self.check_online()?;
        draft.validate()?;
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        let todo = Todo {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            priority: draft.priority,
            completed: false,
            due_date: draft.due_date,
            created_at: now_ms,
            updated_at: now_ms,
        };
        self.rows.borrow_mut().push(todo.clone());
        Ok(todo)
    }

    fn update_todo(&self, todo: &Todo) -> RepoResult<()> {
        self.check_online()?;
        todo.validate()?;
        let mut rows = self.rows.borrow_mut();
        let slot = rows
            .iter_mut()
            .find(|row| row.id == todo.id)
            .ok_or(RepoError::NotFound(todo.id))?;
        *slot = todo.clone();
        Ok(())
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        self.check_online()?;
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_todos(&self, predicate: DeletePredicate) -> RepoResult<usize> {
        self.check_online()?;
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| !predicate.matches(row));
        Ok(before - rows.len())
    }
}

fn complete(service: &TodoService<&MemoryRepo>, id: TodoId) -> Todo {
    let input = UpdateTodoInput {
        completed: Patch::Value(true),
        ..UpdateTodoInput::default()
    };
    service.update_todo(id, &input).unwrap()
}

#[test]
fn list_filters_partition_all_items() {
    let repo = MemoryRepo::default();
    let service = TodoService::new(&repo);

    let a = service.create_todo(&CreateTodoInput::new("a")).unwrap();
    let b = service.create_todo(&CreateTodoInput::new("b")).unwrap();
    let c = service.create_todo(&CreateTodoInput::new("c")).unwrap();
    complete(&service, b.id);

    let completed = service.list_todos(Some("completed")).unwrap();
    let pending = service.list_todos(Some("pending")).unwrap();
    let all = service.list_todos(Some("all")).unwrap();

    assert!(completed.iter().all(|todo| todo.completed));
    assert!(pending.iter().all(|todo| !todo.completed));
    assert_eq!(completed.len() + pending.len(), all.len());
    let ids: Vec<_> = all.iter().map(|todo| todo.id).collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);
}

#[test]
fn delete_completed_leaves_pending_items() {
    let repo = MemoryRepo::default();
    let service = TodoService::new(&repo);

    let keep = service.create_todo(&CreateTodoInput::new("keep")).unwrap();
    let drop_one = service.create_todo(&CreateTodoInput::new("drop 1")).unwrap();
    let drop_two = service.create_todo(&CreateTodoInput::new("drop 2")).unwrap();
    complete(&service, drop_one.id);
    complete(&service, drop_two.id);

    assert_eq!(service.delete_completed().unwrap(), 2);
    let remaining = service.list_todos(None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
    assert_eq!(service.delete_all().unwrap(), 1);
    assert_eq!(service.delete_all().unwrap(), 0);
}

#[test]
fn update_checks_existence_before_validation() {
    let repo = MemoryRepo::default();
    let service = TodoService::new(&repo);
    let invalid = UpdateTodoInput {
        title: Patch::Null,
        ..UpdateTodoInput::default()
    };

    assert!(matches!(
        service.update_todo(5, &invalid),
        Err(TodoServiceError::NotFound(5))
    ));

    let created = service.create_todo(&CreateTodoInput::new("x")).unwrap();
    assert!(matches!(
        service.update_todo(created.id, &invalid),
        Err(TodoServiceError::InvalidInput(_))
    ));
    assert_eq!(service.get_todo(created.id).unwrap().unwrap(), created);
}

#[test]
fn storage_failures_surface_as_storage_unavailable() {
    let repo = MemoryRepo::default();
    let service = TodoService::new(&repo);
    let created = service.create_todo(&CreateTodoInput::new("x")).unwrap();
    repo.offline.set(true);

    assert!(matches!(
        service.list_todos(None),
        Err(TodoServiceError::StorageUnavailable(_))
    ));
    assert!(matches!(
        service.get_todo(created.id),
        Err(TodoServiceError::StorageUnavailable(_))
    ));
    assert!(matches!(
        service.create_todo(&CreateTodoInput::new("y")),
        Err(TodoServiceError::StorageUnavailable(_))
    ));
    assert!(matches!(
        service.delete_completed(),
        Err(TodoServiceError::StorageUnavailable(_))
    ));
}
