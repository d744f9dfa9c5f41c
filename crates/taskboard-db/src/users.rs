use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use sha2::{Digest, Sha256};
use taskboard_types::User;
use taskboard_types::api::{CreateUserRequest, UpdateUserRequest};

use crate::models::UserRow;
use crate::{Changes, Database, OptionalExt, row_exists, timestamp};

const USER_COLUMNS: &str = "id, username, password, email, full_name, created_at, updated_at";

/// Hex SHA-256 of the password: one round, no salt. Matches what existing
/// database files hold; it is not a safe password hash.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

impl Database {
    pub fn create_user(&self, req: &CreateUserRequest) -> Result<User> {
        self.with_conn(|conn| {
            let now = timestamp();
            conn.execute(
                "INSERT INTO users (username, password, email, full_name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    req.username,
                    hash_password(&req.password),
                    req.email,
                    req.full_name,
                    now,
                ],
            )?;

            let id = conn.last_insert_rowid();
            let row = query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow!("User {} missing after insert", id))?;
            Ok(row.into())
        })
    }

    /// Alphabetical by username.
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY username ASC"
            ))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .map(|row| row.map(User::from))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| Ok(query_user_by_id(conn, id)?.map(User::from)))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
            ))?;
            stmt.query_row([username], user_from_row).optional()
        })
    }

    /// A supplied password is re-hashed before it is stored.
    pub fn update_user(&self, id: i64, patch: &UpdateUserRequest) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let mut changes = Changes::default();
            if let Some(username) = &patch.username {
                changes.set("username", username.clone());
            }
            if let Some(password) = &patch.password {
                changes.set("password", hash_password(password));
            }
            if let Some(email) = &patch.email {
                changes.set("email", email.clone());
            }
            if let Some(full_name) = &patch.full_name {
                changes.set("full_name", full_name.clone());
            }

            if !changes.is_empty() {
                changes.apply(conn, "users", id)?;
            }
            Ok(query_user_by_id(conn, id)?.map(User::from))
        })
    }

    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| row_exists(conn, "users", id))
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    stmt.query_row([id], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        email: row.get(3)?,
        full_name: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
