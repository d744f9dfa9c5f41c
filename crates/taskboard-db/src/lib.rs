pub mod migrations;
pub mod models;
mod task_types;
mod tasks;
mod users;

pub use users::hash_password;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, ffi, params_from_iter};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::init(conn)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// A private database that disappears with the handle. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

/// True when `err` is a SQLite UNIQUE constraint failure.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// True when `err` is a SQLite FOREIGN KEY constraint failure.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn constraint_code(err: &anyhow::Error) -> Option<i32> {
    match err.downcast_ref::<rusqlite::Error>()? {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}

/// Current time as stored in `created_at` / `updated_at`: RFC 3339, UTC, milliseconds.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whether a row with `id` exists in `table`. `table` is always a literal from this crate.
pub(crate) fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let found: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        [id],
        |row| row.get(0),
    )?;
    Ok(found != 0)
}

/// Column assignments for a partial `UPDATE`, collected one supplied field at a time.
#[derive(Default)]
pub(crate) struct Changes {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Changes {
    pub(crate) fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Writes the assignments and stamps `updated_at`, never earlier than its previous
    /// value (and so never earlier than `created_at`).
    /// Returns the number of rows touched.
    pub(crate) fn apply(self, conn: &Connection, table: &str, id: i64) -> Result<usize> {
        let Self { columns, mut values } = self;
        let mut assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();

        values.push(Value::Text(timestamp()));
        assignments.push(format!("updated_at = MAX(?{}, updated_at)", values.len()));
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            assignments.join(", "),
            values.len()
        );
        Ok(conn.execute(&sql, params_from_iter(values))?)
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_types::TaskPriority;
    use taskboard_types::api::{CreateTaskRequest, CreateTaskTypeRequest};

    #[test]
    fn duplicate_names_are_unique_violations() {
        let db = Database::open_in_memory().unwrap();
        let request = CreateTaskTypeRequest {
            name: "Bug".into(),
            description: None,
            color: None,
        };
        db.create_task_type(&request).unwrap();

        let err = db.create_task_type(&request).unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
    }

    #[test]
    fn dangling_references_are_foreign_key_violations() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .create_task(&CreateTaskRequest {
                title: "Orphan".into(),
                description: "Points nowhere".into(),
                status: None,
                priority: TaskPriority::Low,
                task_type_id: Some(42),
                assigned_to_user_id: None,
                due_date: None,
            })
            .unwrap_err();
        assert!(is_foreign_key_violation(&err));
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let db = Database::open_in_memory().unwrap();
        let created = db
            .create_task_type(&CreateTaskTypeRequest {
                name: "Spike".into(),
                description: None,
                color: None,
            })
            .unwrap();

        // A stamp written by a clock that was ahead of the current one.
        let ahead = "2999-01-01T00:00:00.000Z";
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE task_types SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![ahead, created.id],
            )?;
            Ok(())
        })
        .unwrap();

        let mut changes = Changes::default();
        changes.set("color", "#123456".to_string());
        db.with_conn(|conn| changes.apply(conn, "task_types", created.id))
            .unwrap();

        let stamped: String = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT updated_at FROM task_types WHERE id = ?1",
                    [created.id],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(stamped, ahead);
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("taskboard-db-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("reopen.db");
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::open(&path).unwrap();
            db.create_task_type(&CreateTaskTypeRequest {
                name: "Story".into(),
                description: Some("User facing".into()),
                color: Some("#00FF00".into()),
            })
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let types = db.list_task_types().unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Story");

        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
