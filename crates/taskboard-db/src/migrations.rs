use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::{hash_password, timestamp};

pub const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";
const ADMIN_FULL_NAME: &str = "Administrator";

/// Creates or upgrades the schema. Safe to run on every start.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS task_types (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            description TEXT,
            color       TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            email       TEXT,
            full_name   TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'To Do',
            priority            TEXT NOT NULL,
            task_type_id        INTEGER REFERENCES task_types(id) ON DELETE SET NULL,
            assigned_to_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            due_date            TEXT,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );
        ",
    )?;

    // Files written before task types and assignees existed lack these columns.
    ensure_column(
        conn,
        "tasks",
        "task_type_id",
        "INTEGER REFERENCES task_types(id) ON DELETE SET NULL",
    )?;
    ensure_column(
        conn,
        "tasks",
        "assigned_to_user_id",
        "INTEGER REFERENCES users(id) ON DELETE SET NULL",
    )?;

    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
        CREATE INDEX IF NOT EXISTS idx_tasks_task_type ON tasks(task_type_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assigned_to_user_id);
        ",
    )?;

    seed_admin(conn)?;

    info!("Database migrations complete");
    Ok(())
}

fn ensure_column(conn: &Connection, table: &str, column: &str, definition: &str) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if !columns.iter().any(|name| name == column) {
        conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))?;
        info!("Added {} column to {} table", column, table);
    }
    Ok(())
}

fn seed_admin(conn: &Connection) -> Result<()> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        [ADMIN_USERNAME],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Ok(());
    }

    let now = timestamp();
    conn.execute(
        "INSERT INTO users (username, password, email, full_name, created_at, updated_at)
         VALUES (?1, ?2, NULL, ?3, ?4, ?4)",
        rusqlite::params![
            ADMIN_USERNAME,
            hash_password(ADMIN_PASSWORD),
            ADMIN_FULL_NAME,
            now
        ],
    )?;
    info!("Admin user created (username: {})", ADMIN_USERNAME);
    Ok(())
}
