use crate::models::{User, UserSummary};
use crate::services::BlogError;
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

const MAX_USERNAME_LENGTH: usize = 150;

fn validate_username(username: &str) -> Result<()> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '+'));
    if !valid {
        return Err(BlogError::InvalidUsername(username.to_string()).into());
    }
    Ok(())
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        is_staff: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub(crate) fn insert_user(conn: &Connection, username: &str, is_staff: bool) -> Result<i64> {
    validate_username(username)?;
    conn.execute(
        "INSERT INTO users (username, is_staff) VALUES (?, ?)",
        (username, is_staff),
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(user_id = id, username, is_staff, "created user");
    Ok(id)
}

pub(crate) fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, is_staff, created_at FROM users WHERE username = ?",
            [username],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub(crate) fn get_or_insert_user(conn: &Connection, username: &str, is_staff: bool) -> Result<i64> {
    match find_by_username(conn, username)? {
        Some(user) => Ok(user.id),
        None => insert_user(conn, username, is_staff),
    }
}

pub(crate) fn update_staff(conn: &Connection, username: &str, is_staff: bool) -> Result<()> {
    let affected = conn.execute(
        "UPDATE users SET is_staff = ? WHERE username = ?",
        (is_staff, username),
    )?;
    if affected == 0 {
        return Err(BlogError::UnknownUser(username.to_string()).into());
    }
    Ok(())
}

/// Access to the users referenced by posts, likes and comments.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, username: &str, is_staff: bool) -> Result<i64> {
        insert_user(&*self.db.get()?, username, is_staff)
    }

    /// Returns the id of `username`, creating the user when missing.
    pub fn get_or_create(&self, username: &str, is_staff: bool) -> Result<i64> {
        get_or_insert_user(&*self.db.get()?, username, is_staff)
    }

    pub fn get(&self, id: i64) -> Result<Option<User>> {
        let conn = self.db.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, is_staff, created_at FROM users WHERE id = ?",
                [id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        find_by_username(&*self.db.get()?, username)
    }

    pub fn list(&self) -> Result<Vec<User>> {
        let conn = self.db.get()?;
        let mut stmt =
            conn.prepare("SELECT id, username, is_staff, created_at FROM users ORDER BY username")?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn set_staff(&self, username: &str, is_staff: bool) -> Result<()> {
        update_staff(&*self.db.get()?, username, is_staff)
    }

    /// Loads the summaries of every listed user in a single query.
    pub fn summaries(&self, ids: &[i64]) -> Result<HashMap<i64, UserSummary>> {
        let mut by_id = HashMap::new();
        if ids.is_empty() {
            return Ok(by_id);
        }

        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT id, username FROM users WHERE id IN ({})",
            placeholders
        );

        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids), |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        })?;
        for row in rows {
            let user = row?;
            by_id.insert(user.id, user);
        }
        Ok(by_id)
    }
}
