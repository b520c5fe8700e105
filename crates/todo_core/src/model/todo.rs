//! Todo domain model and request shapes.
//!
//! # Responsibility
//! - Define the canonical `Todo` record returned to callers.
//! - Define create/update input shapes and the rules they must pass before
//!   any data reaches storage.
//!
//! # Invariants
//! - `title` is never empty or whitespace-only after trimming.
//! - `priority` is always one of `low|medium|high`; unknown values are
//!   rejected, never coerced.
//! - `updated_at >= created_at`, and every mutation strictly advances
//!   `updated_at`.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier. Never reused after deletion.
pub type TodoId = i64;

/// Task urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Returns the wire/storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a priority, ignoring surrounding whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Named list predicate for `completed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }

    /// Parses `all|completed|pending`, ignoring whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "completed" => Some(Self::Completed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Returns whether `todo` belongs to this filter's result set.
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Completed => todo.completed,
            Self::Pending => !todo.completed,
        }
    }
}

/// Bulk delete predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePredicate {
    /// Rows with `completed = true`.
    Completed,
    /// Every row.
    All,
}

impl DeletePredicate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::All => "all",
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::Completed => todo.completed,
            Self::All => true,
        }
    }
}

/// Validation failures for todo inputs and persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Title missing, empty, or whitespace-only.
    EmptyTitle,
    /// Priority outside `low|medium|high`.
    InvalidPriority(String),
    /// A non-nullable field was supplied as explicit `null`.
    NullField(&'static str),
    /// `updated_at` is earlier than `created_at`.
    InvalidTimestamps { created_at: i64, updated_at: i64 },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::InvalidPriority(value) => write!(
                f,
                "invalid priority `{value}`; expected low|medium|high"
            ),
            Self::NullField(field) => write!(f, "{field} must not be null"),
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for TodoValidationError {}

/// Canonical todo record, serialized as-is for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    /// Trimmed, never blank.
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    /// Optional deadline, Unix epoch milliseconds.
    pub due_date: Option<i64>,
    /// Unix epoch milliseconds, immutable after creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
}

impl Todo {
    /// Checks record-level invariants.
    ///
    /// Used on both write paths and read-back so corrupted rows surface as
    /// errors instead of being returned to callers.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(TodoValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Applies only the fields present in `changes` and refreshes
    /// `updated_at`.
    pub fn apply_changes(&mut self, changes: &TodoChanges, now_ms: i64) {
        if let Some(title) = changes.title.as_ref() {
            self.title = title.clone();
        }
        match &changes.description {
            Patch::Absent => {}
            Patch::Null => self.description = None,
            Patch::Value(value) => self.description = Some(value.clone()),
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        match &changes.due_date {
            Patch::Absent => {}
            Patch::Null => self.due_date = None,
            Patch::Value(value) => self.due_date = Some(*value),
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.touch(now_ms);
    }

    /// Flips `completed` and refreshes `updated_at`.
    pub fn toggle_completed(&mut self, now_ms: i64) {
        self.completed = !self.completed;
        self.touch(now_ms);
    }

    // Same-millisecond mutations still move `updated_at` forward.
    fn touch(&mut self, now_ms: i64) {
        self.updated_at = now_ms.max(self.updated_at.saturating_add(1));
    }
}

/// Tri-state field presence for partial updates.
///
/// `Absent` means the field was not in the request, `Null` means it was sent
/// as JSON `null`. Use with `#[serde(default)]` so missing keys decode as
/// `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(value) => Patch::Value(value),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Validated create payload ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<i64>,
}

impl TodoDraft {
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Create request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateTodoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Defaults to `low` when absent or `null`.
    pub priority: Option<String>,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
}

impl CreateTodoInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Normalizes this request into a storable draft.
    ///
    /// # Errors
    /// - `EmptyTitle` when title is missing or blank.
    /// - `InvalidPriority` when a supplied priority is unknown.
    pub fn validate(&self) -> Result<TodoDraft, TodoValidationError> {
        let title = normalize_title(self.title.as_deref())?;
        let priority = match self.priority.as_deref() {
            Some(value) => parse_priority(value)?,
            None => Priority::default(),
        };

        Ok(TodoDraft {
            title,
            description: normalize_description(self.description.as_deref()),
            priority,
            due_date: self.due_date,
        })
    }
}

/// Partial update request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateTodoInput {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub priority: Patch<String>,
    #[serde(default)]
    pub completed: Patch<bool>,
    /// `null` clears the deadline.
    #[serde(default)]
    pub due_date: Patch<i64>,
}

impl UpdateTodoInput {
    /// Normalizes supplied fields into a change set.
    ///
    /// # Errors
    /// - `NullField` when `title`, `priority` or `completed` is `null`.
    /// - `EmptyTitle` when a supplied title is blank.
    /// - `InvalidPriority` when a supplied priority is unknown.
    pub fn validate(&self) -> Result<TodoChanges, TodoValidationError> {
        let title = match self.title.as_ref() {
            Patch::Absent => None,
            Patch::Null => return Err(TodoValidationError::NullField("title")),
            Patch::Value(value) => Some(normalize_title(Some(value.as_str()))?),
        };

        let description = match self.description.as_ref() {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(value) => normalize_description(Some(value.as_str())).into(),
        };

        let priority = match self.priority.as_ref() {
            Patch::Absent => None,
            Patch::Null => return Err(TodoValidationError::NullField("priority")),
            Patch::Value(value) => Some(parse_priority(value)?),
        };

        let completed = match self.completed {
            Patch::Absent => None,
            Patch::Null => return Err(TodoValidationError::NullField("completed")),
            Patch::Value(value) => Some(value),
        };

        Ok(TodoChanges {
            title,
            description,
            priority,
            completed,
            due_date: self.due_date.clone(),
        })
    }
}

/// Validated partial update. `None`/`Absent` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    /// `Null` clears the description.
    pub description: Patch<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub due_date: Patch<i64>,
}

impl TodoChanges {
    /// Returns whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_absent()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.due_date.is_absent()
    }
}

fn normalize_title(value: Option<&str>) -> Result<String, TodoValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(TodoValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

// Blank descriptions are stored as NULL.
fn normalize_description(value: Option<&str>) -> Option<String> {
    value
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn parse_priority(value: &str) -> Result<Priority, TodoValidationError> {
    Priority::parse(value).ok_or_else(|| TodoValidationError::InvalidPriority(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{Priority, StatusFilter, Todo};

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse(" HIGH "), Some(Priority::High));
        assert_eq!(Priority::parse("Medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        assert_eq!(StatusFilter::parse("Pending"), Some(StatusFilter::Pending));
        assert_eq!(StatusFilter::parse("done"), None);
        assert_eq!(StatusFilter::parse(""), None);
    }

    #[test]
    fn toggle_advances_updated_at_within_same_millisecond() {
        let mut todo = Todo {
            id: 1,
            title: "write report".to_string(),
            description: None,
            priority: Priority::Low,
            completed: false,
            due_date: None,
            created_at: 1_000,
            updated_at: 1_000,
        };

        todo.toggle_completed(1_000);
        assert!(todo.completed);
        assert_eq!(todo.updated_at, 1_001);

        todo.toggle_completed(5_000);
        assert!(!todo.completed);
        assert_eq!(todo.updated_at, 5_000);
    }
}
