use std::str::FromStr;

use anyhow::{Result, anyhow};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, Row, params_from_iter};
use taskboard_types::Task;
use taskboard_types::api::{CreateTaskRequest, TaskFilter, UpdateTaskRequest};

use crate::{Changes, Database, OptionalExt, row_exists, timestamp};

const TASK_COLUMNS: &str = "id, title, description, status, priority, task_type_id, \
                            assigned_to_user_id, due_date, created_at, updated_at";

impl Database {
    pub fn create_task(&self, req: &CreateTaskRequest) -> Result<Task> {
        self.with_conn(|conn| {
            let now = timestamp();
            conn.execute(
                "INSERT INTO tasks (title, description, status, priority, task_type_id,
                                    assigned_to_user_id, due_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                rusqlite::params![
                    req.title,
                    req.description,
                    req.status.unwrap_or_default().as_str(),
                    req.priority.as_str(),
                    req.task_type_id,
                    req.assigned_to_user_id,
                    req.due_date,
                    now,
                ],
            )?;

            let id = conn.last_insert_rowid();
            query_task(conn, id)?.ok_or_else(|| anyhow!("Task {} missing after insert", id))
        })
    }

    /// Newest first. Every supplied filter must match.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE 1=1");
            let mut values: Vec<Value> = Vec::new();

            if let Some(status) = filter.status {
                values.push(Value::Text(status.as_str().to_string()));
                sql.push_str(&format!(" AND status = ?{}", values.len()));
            }
            if let Some(priority) = filter.priority {
                values.push(Value::Text(priority.as_str().to_string()));
                sql.push_str(&format!(" AND priority = ?{}", values.len()));
            }
            if let Some(date) = &filter.date {
                values.push(Value::Text(date.clone()));
                sql.push_str(&format!(" AND DATE(due_date) = DATE(?{})", values.len()));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values), task_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| query_task(conn, id))
    }

    /// Applies only the supplied fields. An empty patch returns the row untouched.
    /// `None` when no task has `id`.
    pub fn update_task(&self, id: i64, patch: &UpdateTaskRequest) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let mut changes = Changes::default();
            if let Some(title) = &patch.title {
                changes.set("title", title.clone());
            }
            if let Some(description) = &patch.description {
                changes.set("description", description.clone());
            }
            if let Some(status) = patch.status {
                changes.set("status", status.as_str().to_string());
            }
            if let Some(priority) = patch.priority {
                changes.set("priority", priority.as_str().to_string());
            }
            if let Some(task_type_id) = patch.task_type_id {
                changes.set("task_type_id", task_type_id);
            }
            if let Some(user_id) = patch.assigned_to_user_id {
                changes.set("assigned_to_user_id", user_id);
            }
            if let Some(due_date) = &patch.due_date {
                changes.set("due_date", due_date.clone());
            }

            if !changes.is_empty() {
                changes.apply(conn, "tasks", id)?;
            }
            query_task(conn, id)
        })
    }

    /// Returns whether a row was removed.
    pub fn delete_task(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    pub fn task_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| row_exists(conn, "tasks", id))
    }
}

fn query_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
    stmt.query_row([id], task_from_row).optional()
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_text(row, 3)?,
        priority: parse_text(row, 4)?,
        task_type_id: row.get(5)?,
        assigned_to_user_id: row.get(6)?,
        due_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
