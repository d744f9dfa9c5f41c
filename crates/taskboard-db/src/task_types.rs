use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use taskboard_types::TaskType;
use taskboard_types::api::{CreateTaskTypeRequest, UpdateTaskTypeRequest};

use crate::{Changes, Database, OptionalExt, row_exists, timestamp};

const TASK_TYPE_COLUMNS: &str = "id, name, description, color, created_at, updated_at";

impl Database {
    pub fn create_task_type(&self, req: &CreateTaskTypeRequest) -> Result<TaskType> {
        self.with_conn(|conn| {
            let now = timestamp();
            conn.execute(
                "INSERT INTO task_types (name, description, color, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![req.name, req.description, req.color, now],
            )?;

            let id = conn.last_insert_rowid();
            query_task_type(conn, id)?
                .ok_or_else(|| anyhow!("Task type {} missing after insert", id))
        })
    }

    /// Alphabetical by name.
    pub fn list_task_types(&self) -> Result<Vec<TaskType>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_TYPE_COLUMNS} FROM task_types ORDER BY name ASC"
            ))?;
            let rows = stmt
                .query_map([], task_type_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_task_type(&self, id: i64) -> Result<Option<TaskType>> {
        self.with_conn(|conn| query_task_type(conn, id))
    }

    pub fn update_task_type(
        &self,
        id: i64,
        patch: &UpdateTaskTypeRequest,
    ) -> Result<Option<TaskType>> {
        self.with_conn(|conn| {
            let mut changes = Changes::default();
            if let Some(name) = &patch.name {
                changes.set("name", name.clone());
            }
            if let Some(description) = &patch.description {
                changes.set("description", description.clone());
            }
            if let Some(color) = &patch.color {
                changes.set("color", color.clone());
            }

            if !changes.is_empty() {
                changes.apply(conn, "task_types", id)?;
            }
            query_task_type(conn, id)
        })
    }

    pub fn delete_task_type(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM task_types WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    pub fn task_type_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| row_exists(conn, "task_types", id))
    }
}

fn query_task_type(conn: &Connection, id: i64) -> Result<Option<TaskType>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_TYPE_COLUMNS} FROM task_types WHERE id = ?1"
    ))?;
    stmt.query_row([id], task_type_from_row).optional()
}

fn task_type_from_row(row: &Row<'_>) -> rusqlite::Result<TaskType> {
    Ok(TaskType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> CreateTaskTypeRequest {
        CreateTaskTypeRequest {
            name: name.into(),
            description: None,
            color: None,
        }
    }

    #[test]
    fn listed_by_name() {
        let db = Database::open_in_memory().unwrap();
        db.create_task_type(&kind("Story")).unwrap();
        db.create_task_type(&kind("Bug")).unwrap();
        db.create_task_type(&kind("Epic")).unwrap();

        let names: Vec<String> = db
            .list_task_types()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Bug", "Epic", "Story"]);
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let db = Database::open_in_memory().unwrap();
        let created = db
            .create_task_type(&CreateTaskTypeRequest {
                name: "Bug".into(),
                description: Some("Something broke".into()),
                color: Some("#FF0000".into()),
            })
            .unwrap();

        let updated = db
            .update_task_type(
                created.id,
                &UpdateTaskTypeRequest {
                    color: Some(Some("#00ff00".into())),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Bug");
        assert_eq!(updated.description.as_deref(), Some("Something broke"));
        assert_eq!(updated.color.as_deref(), Some("#00ff00"));

        let cleared = db
            .update_task_type(
                created.id,
                &UpdateTaskTypeRequest {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn delete_and_exists() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_task_type(&kind("Spike")).unwrap();
        assert!(db.task_type_exists(created.id).unwrap());
        assert!(db.delete_task_type(created.id).unwrap());
        assert!(!db.task_type_exists(created.id).unwrap());
        assert!(!db.delete_task_type(created.id).unwrap());
    }
}
