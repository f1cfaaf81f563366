//! SQLite todo repository.
//!
//! All operations are scoped by owner id. Tag association goes through the
//! `todo_tags` join table; tag ids that do not belong to the owner are
//! silently dropped at association time.

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::utils::current_timestamp;
use crate::db::{DbError, DbResult, NewTodo, Priority, SortOrder, Tag, Todo, TodoChanges,
    TodoPage, TodoQuery};

/// SQLx-backed todo repository.
pub struct SqliteTodoRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl SqliteTodoRepository<'_> {
    /// Create a todo for the given user, associating any owned tags in the
    /// same transaction.
    pub async fn create(&self, user_id: Uuid, todo: &NewTodo) -> DbResult<Todo> {
        let id = Uuid::new_v4();
        let now = current_timestamp();
        let priority = todo.priority.unwrap_or_default();

        let mut tx = self.pool.begin().await.map_err(DbError::from_sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO todos (id, user_id, title, description, completed, priority, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(todo.title.trim())
        .bind(todo.description.as_deref().map(str::trim))
        .bind(priority.to_string())
        .bind(&todo.due_date)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        if let Some(tag_ids) = &todo.tag_ids {
            replace_tag_links(&mut tx, user_id, id, tag_ids).await?;
        }

        tx.commit().await.map_err(DbError::from_sqlx)?;

        self.get(user_id, id).await?.ok_or(DbError::Database {
            message: "Todo vanished after insert".to_string(),
        })
    }

    /// List the user's todos with filtering, search, and pagination.
    ///
    /// The total is counted over the filtered set before pagination is
    /// applied; a page past the end yields an empty list.
    pub async fn list(&self, user_id: Uuid, query: &TodoQuery) -> DbResult<TodoPage> {
        let mut conditions: Vec<String> = vec!["user_id = ?".to_string()];
        let mut bind_values: Vec<String> = vec![user_id.to_string()];

        if let Some(completed) = query.completed {
            conditions.push("completed = ?".to_string());
            bind_values.push(if completed { "1" } else { "0" }.to_string());
        }

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            conditions.push("(title LIKE ? OR IFNULL(description, '') LIKE ?)".to_string());
            bind_values.push(pattern.clone());
            bind_values.push(pattern);
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let order = match query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        // Ties on created_at fall back to id so repeated calls see the
        // same total order.
        let order_clause = format!("ORDER BY created_at {order}, id {order}");

        let offset = (query.page.saturating_sub(1) as i64) * query.page_size as i64;
        let limit_clause = format!("LIMIT {} OFFSET {}", query.page_size, offset);

        let count_sql = format!("SELECT COUNT(*) FROM todos {}", where_clause);
        let mut count_query = sqlx::query_scalar(&count_sql);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }
        let total: i64 = count_query
            .fetch_one(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        let sql = format!(
            "SELECT id, user_id, title, description, completed, priority, due_date, created_at, updated_at
             FROM todos {} {} {}",
            where_clause, order_clause, limit_clause
        );
        let mut page_query = sqlx::query(&sql);
        for value in &bind_values {
            page_query = page_query.bind(value);
        }
        let rows = page_query
            .fetch_all(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        let mut items = rows
            .iter()
            .map(row_to_todo)
            .collect::<DbResult<Vec<Todo>>>()?;
        self.attach_tags(&mut items).await?;

        Ok(TodoPage { items, total })
    }

    /// Scoped lookup: returns the todo only when both id and owner match,
    /// with tags populated.
    pub async fn get(&self, user_id: Uuid, todo_id: Uuid) -> DbResult<Option<Todo>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, description, completed, priority, due_date, created_at, updated_at
             FROM todos WHERE id = ? AND user_id = ?",
        )
        .bind(todo_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut todos = vec![row_to_todo(&row)?];
        self.attach_tags(&mut todos).await?;
        Ok(todos.pop())
    }

    /// Apply a partial update. Supplied fields replace prior values;
    /// `tag_ids` replaces the full tag set. `updated_at` is bumped on every
    /// successful call, even when no field changed.
    pub async fn update(
        &self,
        user_id: Uuid,
        todo_id: Uuid,
        changes: &TodoChanges,
    ) -> DbResult<Option<Todo>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from_sqlx)?;

        let row = sqlx::query(
            "SELECT id, user_id, title, description, completed, priority, due_date, created_at, updated_at
             FROM todos WHERE id = ? AND user_id = ?",
        )
        .bind(todo_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut todo = row_to_todo(&row)?;

        if let Some(title) = &changes.title {
            todo.title = title.trim().to_string();
        }
        if let Some(description) = &changes.description {
            let trimmed = description.trim();
            todo.description = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        if let Some(priority) = changes.priority {
            todo.priority = priority;
        }
        if let Some(due_date) = &changes.due_date {
            todo.due_date = Some(due_date.clone());
        }
        todo.updated_at = current_timestamp();

        sqlx::query(
            r#"
            UPDATE todos
            SET title = ?, description = ?, completed = ?, priority = ?, due_date = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.priority.to_string())
        .bind(&todo.due_date)
        .bind(&todo.updated_at)
        .bind(todo_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        if let Some(tag_ids) = &changes.tag_ids {
            sqlx::query("DELETE FROM todo_tags WHERE todo_id = ?")
                .bind(todo_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(DbError::from_sqlx)?;
            replace_tag_links(&mut tx, user_id, todo_id, tag_ids).await?;
        }

        tx.commit().await.map_err(DbError::from_sqlx)?;

        self.get(user_id, todo_id).await
    }

    /// Scoped hard delete. Association rows go with the todo.
    pub async fn delete(&self, user_id: Uuid, todo_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(todo_id.to_string())
            .bind(user_id.to_string())
            .execute(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// Populate `tags` for a batch of todos with a single join query.
    async fn attach_tags(&self, todos: &mut [Todo]) -> DbResult<()> {
        if todos.is_empty() {
            return Ok(());
        }

        let placeholders: Vec<&str> = todos.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT tt.todo_id, t.id, t.user_id, t.name, t.color, t.created_at
             FROM todo_tags tt
             JOIN tags t ON t.id = tt.tag_id
             WHERE tt.todo_id IN ({})
             ORDER BY t.name ASC",
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for todo in todos.iter() {
            query = query.bind(todo.id.to_string());
        }
        let rows = query
            .fetch_all(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        let mut by_todo: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in &rows {
            let todo_id: String = row.get("todo_id");
            let todo_id = parse_uuid(&todo_id)?;
            by_todo.entry(todo_id).or_default().push(row_to_tag(row)?);
        }

        for todo in todos.iter_mut() {
            todo.tags = by_todo.remove(&todo.id).unwrap_or_default();
        }

        Ok(())
    }
}

/// Insert join rows for the subset of `tag_ids` owned by `user_id`.
async fn replace_tag_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: Uuid,
    todo_id: Uuid,
    tag_ids: &[Uuid],
) -> DbResult<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let placeholders: Vec<&str> = tag_ids.iter().map(|_| "?").collect();
    let sql = format!(
        "SELECT id FROM tags WHERE user_id = ? AND id IN ({})",
        placeholders.join(", ")
    );
    let mut query = sqlx::query_scalar::<_, String>(&sql).bind(user_id.to_string());
    for tag_id in tag_ids {
        query = query.bind(tag_id.to_string());
    }
    let owned_ids = query.fetch_all(&mut **tx).await.map_err(DbError::from_sqlx)?;

    let now = current_timestamp();
    for tag_id in owned_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO todo_tags (todo_id, tag_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(todo_id.to_string())
        .bind(tag_id)
        .bind(&now)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from_sqlx)?;
    }

    Ok(())
}

fn parse_uuid(value: &str) -> DbResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| DbError::InvalidData {
        message: format!("Invalid uuid in database: {}", e),
    })
}

fn row_to_todo(row: &sqlx::sqlite::SqliteRow) -> DbResult<Todo> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let priority: String = row.get("priority");

    Ok(Todo {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        title: row.get("title"),
        description: row.get("description"),
        completed: row.get("completed"),
        priority: Priority::from_str(&priority).unwrap_or_default(),
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        tags: vec![],
    })
}

pub(crate) fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> DbResult<Tag> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");

    Ok(Tag {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        name: row.get("name"),
        color: row.get("color"),
        created_at: row.get("created_at"),
    })
}
