//! MCP server exposing task tools.
//!
//! Tools operate on the reduced task model: integer ids, no tags or
//! priorities. Every tool call carries the caller's user id explicitly
//! and all store access is scoped by it.

use std::str::FromStr;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars,
    schemars::JsonSchema,
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::{DbError, SqliteDatabase, Task, TaskChanges, TaskStatusFilter};

const MAX_TASK_TITLE_LEN: usize = 200;
const MAX_TASK_DESCRIPTION_LEN: usize = 2000;

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddTaskParams {
    #[schemars(description = "ID of the user the task belongs to")]
    pub user_id: String,
    #[schemars(description = "Task title (required, max 200 characters)")]
    pub title: String,
    #[schemars(description = "Optional task description (max 2000 characters)")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksParams {
    #[schemars(description = "ID of the user whose tasks to list")]
    pub user_id: String,
    #[schemars(description = "Completion filter: 'all' (default), 'pending', or 'completed'")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompleteTaskParams {
    #[schemars(description = "ID of the user the task belongs to")]
    pub user_id: String,
    #[schemars(description = "ID of the task to mark as completed")]
    pub task_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTaskParams {
    #[schemars(description = "ID of the user the task belongs to")]
    pub user_id: String,
    #[schemars(description = "ID of the task to delete")]
    pub task_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTaskParams {
    #[schemars(description = "ID of the user the task belongs to")]
    pub user_id: String,
    #[schemars(description = "ID of the task to update")]
    pub task_id: i64,
    #[schemars(description = "New title (optional, max 200 characters)")]
    pub title: Option<String>,
    #[schemars(description = "New description (optional, max 2000 characters)")]
    pub description: Option<String>,
}

// =============================================================================
// Server
// =============================================================================

#[derive(Clone)]
pub struct McpServer {
    db: Arc<SqliteDatabase>,
    tool_router: ToolRouter<Self>,
}

fn validate_title(title: &str) -> Result<(), McpError> {
    if title.trim().is_empty() {
        return Err(McpError::invalid_params("Task title cannot be empty", None));
    }
    // Length cap applies to the title as supplied, whitespace included.
    if title.chars().count() > MAX_TASK_TITLE_LEN {
        return Err(McpError::invalid_params(
            "Task title must be 200 characters or less",
            None,
        ));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), McpError> {
    if let Some(d) = description
        && d.chars().count() > MAX_TASK_DESCRIPTION_LEN
    {
        return Err(McpError::invalid_params(
            "Task description must be 2000 characters or less",
            None,
        ));
    }
    Ok(())
}

fn task_not_found() -> McpError {
    McpError::resource_not_found("Task not found or does not belong to user", None)
}

fn map_db_error(e: DbError) -> McpError {
    tracing::error!(error = %e, "Task store operation failed");
    McpError::internal_error(e.to_string(), None)
}

fn task_json(task: &Task) -> serde_json::Value {
    json!({
        "task_id": task.id,
        "title": task.title,
        "description": task.description,
        "completed": task.completed,
        "created_at": task.created_at,
        "updated_at": task.updated_at,
    })
}

fn success(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(&value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize response: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl McpServer {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Add a new task for a user. Title is required and limited to 200 characters; description is optional."
    )]
    pub async fn add_task(
        &self,
        params: Parameters<AddTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        validate_title(&p.title)?;
        validate_description(p.description.as_deref())?;

        let task = self
            .db
            .tasks()
            .create(&p.user_id, &p.title, p.description.as_deref())
            .await
            .map_err(map_db_error)?;

        success(task_json(&task))
    }

    #[tool(
        description = "List a user's tasks, newest first. Filter with status: 'all' (default), 'pending', or 'completed'."
    )]
    pub async fn list_tasks(
        &self,
        params: Parameters<ListTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let status = match p.status.as_deref() {
            None => TaskStatusFilter::All,
            Some(s) => TaskStatusFilter::from_str(s)
                .map_err(|e| McpError::invalid_params(e, None))?,
        };

        let tasks = self
            .db
            .tasks()
            .list(&p.user_id, status)
            .await
            .map_err(map_db_error)?;

        success(json!({
            "tasks": tasks.iter().map(task_json).collect::<Vec<_>>(),
            "total": tasks.len(),
            "status_filter": status.to_string(),
        }))
    }

    #[tool(description = "Mark a user's task as completed.")]
    pub async fn complete_task(
        &self,
        params: Parameters<CompleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let task = self
            .db
            .tasks()
            .complete(&p.user_id, p.task_id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(task_not_found)?;

        success(task_json(&task))
    }

    #[tool(description = "Delete a user's task permanently.")]
    pub async fn delete_task(
        &self,
        params: Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let deleted = self
            .db
            .tasks()
            .delete(&p.user_id, p.task_id)
            .await
            .map_err(map_db_error)?;

        if !deleted {
            return Err(task_not_found());
        }

        success(json!({
            "task_id": p.task_id,
            "deleted": true,
        }))
    }

    #[tool(
        description = "Update a task's title and/or description. At least one field must be provided."
    )]
    pub async fn update_task(
        &self,
        params: Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        if p.title.is_none() && p.description.is_none() {
            return Err(McpError::invalid_params(
                "At least one field (title or description) must be provided",
                None,
            ));
        }
        if let Some(title) = &p.title {
            validate_title(title)?;
        }
        validate_description(p.description.as_deref())?;

        let task = self
            .db
            .tasks()
            .update(
                &p.user_id,
                p.task_id,
                &TaskChanges {
                    title: p.title,
                    description: p.description,
                },
            )
            .await
            .map_err(map_db_error)?
            .ok_or_else(task_not_found)?;

        success(task_json(&task))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(
            "Taskdeck MCP Server - Add, list, complete, update, and delete tasks".to_string(),
        );
        info
    }
}
