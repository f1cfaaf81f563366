//! Domain models for the todo database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

/// A registered user account. `password_hash` is never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Priority levels for todos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A todo item owned by exactly one user. `tags` holds the associated
/// tags eagerly loaded from the join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<Tag>,
}

/// A user-owned label attachable to todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

/// Assistant-facing task: a deliberately reduced model with integer ids
/// and no tags, priority, or due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a todo. Tag ids are filtered to tags owned by the
/// creating user; foreign ids are silently dropped.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Partial update for a todo. `None` leaves a field untouched; a supplied
/// `tag_ids` replaces the full tag set.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Filter, search, sort, and pagination options for todo lists.
#[derive(Debug, Clone)]
pub struct TodoQuery {
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub sort_order: SortOrder,
    /// 1-indexed page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            completed: None,
            search: None,
            sort_order: SortOrder::Desc,
            page: 1,
            page_size: 50,
        }
    }
}

/// Result of a paginated todo list query. `total` counts all matching
/// rows before pagination.
#[derive(Debug, Clone)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub total: i64,
}

/// Input for creating a tag.
#[derive(Debug, Clone, Default)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
}

/// Partial update for a tag.
#[derive(Debug, Clone, Default)]
pub struct TagChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Partial update for an assistant-facing task.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Completion filter for assistant-facing task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl std::fmt::Display for TaskStatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatusFilter::All => write!(f, "all"),
            TaskStatusFilter::Pending => write!(f, "pending"),
            TaskStatusFilter::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TaskStatusFilter::All),
            "pending" => Ok(TaskStatusFilter::Pending),
            "completed" => Ok(TaskStatusFilter::Completed),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}
