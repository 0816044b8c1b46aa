use crate::models::{Comment, CommentWithAuthor, NewComment, UserSummary};
use crate::services::{normalize_timestamp, BlogError};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

pub(crate) fn insert_comment(conn: &Connection, input: NewComment) -> Result<i64> {
    let published_at = normalize_timestamp(input.published_at.as_deref())?;

    let post_exists: Option<i64> = conn
        .query_row("SELECT id FROM posts WHERE id = ?", [input.post_id], |row| {
            row.get(0)
        })
        .optional()?;
    if post_exists.is_none() {
        return Err(BlogError::UnknownPost(input.post_id.to_string()).into());
    }

    conn.execute(
        "INSERT INTO comments (post_id, author_id, text, published_at) VALUES (?, ?, ?, ?)",
        (input.post_id, input.author_id, &input.text, &published_at),
    )?;
    Ok(conn.last_insert_rowid())
}

pub struct CommentRepository<'a> {
    db: &'a Database,
}

impl<'a> CommentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, input: NewComment) -> Result<i64> {
        insert_comment(&*self.db.get()?, input)
    }

    /// Comments of a post, oldest first, with their authors joined in.
    pub fn for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.username
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = ?
            ORDER BY c.published_at, c.id
            "#,
        )?;
        let comments = stmt
            .query_map([post_id], |row| {
                let comment = Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    author_id: row.get(2)?,
                    text: row.get(3)?,
                    published_at: row.get(4)?,
                };
                Ok(CommentWithAuthor {
                    author: UserSummary {
                        id: comment.author_id,
                        username: row.get(5)?,
                    },
                    comment,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    /// Comment counts for a batch of posts in one aggregate query.
    /// Posts without comments are absent from the map.
    pub fn counts_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = post_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT post_id, COUNT(*) FROM comments WHERE post_id IN ({}) GROUP BY post_id",
            placeholders
        );

        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let counts = stmt
            .query_map(rusqlite::params_from_iter(post_ids), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(counts)
    }

    pub fn count_for_post(&self, post_id: i64) -> Result<i64> {
        let conn = self.db.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM comments WHERE post_id = ?",
            [post_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
