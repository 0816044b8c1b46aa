use crate::models::{NewPost, Post, PostRecord, PostWithComments, MAX_POST_TITLE_LENGTH};
use crate::services::comments::CommentRepository;
use crate::services::slug::{generate_slug, validate_slug};
use crate::services::tags::{validated_title, TagRepository};
use crate::services::users::UserRepository;
use crate::services::{normalize_timestamp, BlogError};
use crate::Database;
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrdering {
    /// Newest first. The default ordering of every listing.
    #[default]
    Newest,
    /// Most distinct likers first, newest first among equals.
    Popular,
}

/// An immutable description of which posts to load.
///
/// Every step consumes the query and returns a new one, so a base query can
/// be cloned and refined independently:
///
/// ```
/// use sensive::services::posts::PostQuery;
///
/// let base = PostQuery::new();
/// let popular = base.clone().popular().limit(5);
/// let fresh = base.limit(5);
/// assert_ne!(popular, fresh);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    ordering: PostOrdering,
    tag_id: Option<i64>,
    slug: Option<String>,
    limit: Option<usize>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn popular(self) -> Self {
        Self {
            ordering: PostOrdering::Popular,
            ..self
        }
    }

    #[must_use]
    pub fn newest(self) -> Self {
        Self {
            ordering: PostOrdering::Newest,
            ..self
        }
    }

    #[must_use]
    pub fn tagged(self, tag_id: i64) -> Self {
        Self {
            tag_id: Some(tag_id),
            ..self
        }
    }

    #[must_use]
    pub fn with_slug(self, slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..self
        }
    }

    #[must_use]
    pub fn limit(self, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    pub fn ordering(&self) -> PostOrdering {
        self.ordering
    }

    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(
            r#"
            SELECT p.id, p.title, p.text, p.slug, p.image, p.published_at, p.author_id,
                   COUNT(DISTINCT pl.user_id) AS likes_count
            FROM posts p
            LEFT JOIN post_likes pl ON pl.post_id = p.id
            WHERE 1=1"#,
        );
        let mut params = Vec::new();

        if let Some(slug) = &self.slug {
            sql.push_str(" AND p.slug = ?");
            params.push(Value::Text(slug.clone()));
        }
        // Subquery rather than a join so the tag filter never multiplies like rows.
        if let Some(tag_id) = self.tag_id {
            sql.push_str(" AND p.id IN (SELECT post_id FROM post_tags WHERE tag_id = ?)");
            params.push(Value::Integer(tag_id));
        }

        sql.push_str(" GROUP BY p.id ORDER BY ");
        if self.ordering == PostOrdering::Popular {
            sql.push_str("likes_count DESC, ");
        }
        sql.push_str("p.published_at DESC, p.id DESC");

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(limit as i64));
        }

        (sql, params)
    }
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<(Post, i64)> {
    Ok((
        Post {
            id: row.get(0)?,
            title: row.get(1)?,
            text: row.get(2)?,
            slug: row.get(3)?,
            image: row.get(4)?,
            published_at: row.get(5)?,
            author_id: row.get(6)?,
        },
        row.get(7)?,
    ))
}

/// Inserts a post and links its tags. The caller owns the transaction.
pub(crate) fn insert_post(conn: &Connection, input: NewPost) -> Result<i64> {
    let title = input.title.trim().to_string();
    if title.is_empty() || title.chars().count() > MAX_POST_TITLE_LENGTH {
        return Err(BlogError::InvalidPostTitle {
            max: MAX_POST_TITLE_LENGTH,
        }
        .into());
    }

    let slug = input.slug.unwrap_or_else(|| generate_slug(&title));
    if !validate_slug(&slug) {
        return Err(BlogError::InvalidSlug(slug).into());
    }

    let tag_titles = input
        .tags
        .iter()
        .map(|t| validated_title(t))
        .collect::<Result<Vec<_>>>()?;
    let published_at = normalize_timestamp(input.published_at.as_deref())?;

    let author: Option<(String, bool)> = conn
        .query_row(
            "SELECT username, is_staff FROM users WHERE id = ?",
            [input.author_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match author {
        None => return Err(BlogError::UnknownUser(input.author_id.to_string()).into()),
        Some((username, false)) => return Err(BlogError::AuthorNotStaff(username).into()),
        Some(_) => {}
    }

    conn.execute(
        r#"
        INSERT INTO posts (title, text, slug, image, published_at, author_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
        (
            &title,
            &input.text,
            &slug,
            &input.image,
            &published_at,
            input.author_id,
        ),
    )?;
    let post_id = conn.last_insert_rowid();

    for tag_title in &tag_titles {
        conn.execute("INSERT OR IGNORE INTO tags (title) VALUES (?)", [tag_title])?;
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id) SELECT ?, id FROM tags WHERE title = ?",
            (post_id, tag_title),
        )?;
    }

    tracing::debug!(post_id, slug = %slug, "created post");
    Ok(post_id)
}

pub(crate) fn insert_like(conn: &Connection, post_id: i64, user_id: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)",
        (post_id, user_id),
    )?;
    Ok(inserted > 0)
}

pub(crate) fn find_id_by_slug(conn: &Connection, slug: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row("SELECT id FROM posts WHERE slug = ?", [slug], |row| row.get(0))
        .optional()?;
    Ok(id)
}

pub struct PostRepository<'a> {
    db: &'a Database,
}

impl<'a> PostRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Runs `query` and eager-loads the authors and tags of the result.
    ///
    /// Issues three statements regardless of how many posts match: the posts
    /// themselves, their authors, and their tags with per-tag post counts.
    pub fn fetch(&self, query: &PostQuery) -> Result<Vec<PostRecord>> {
        let rows = self.load(query)?;
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let post_ids: Vec<i64> = rows.iter().map(|(post, _)| post.id).collect();
        let author_ids: Vec<i64> = rows
            .iter()
            .map(|(post, _)| post.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors = UserRepository::new(self.db).summaries(&author_ids)?;
        let mut tags = TagRepository::new(self.db).for_posts(&post_ids)?;

        let records = rows
            .into_iter()
            .map(|(post, likes_count)| PostRecord {
                author: authors.get(&post.author_id).cloned(),
                tags: tags.remove(&post.id).unwrap_or_default(),
                likes_count,
                post,
            })
            .collect();
        Ok(records)
    }

    fn load(&self, query: &PostQuery) -> Result<Vec<(Post, i64)>> {
        let (sql, params) = query.to_sql();
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<Option<PostRecord>> {
        let query = PostQuery::new().with_slug(slug).limit(1);
        Ok(self.fetch(&query)?.into_iter().next())
    }

    /// Attaches comment counts to an already materialized batch using a
    /// single aggregate query.
    pub fn with_comments_count(&self, posts: Vec<PostRecord>) -> Result<Vec<PostWithComments>> {
        let ids: Vec<i64> = posts.iter().map(|p| p.post.id).collect();
        let counts = CommentRepository::new(self.db).counts_for_posts(&ids)?;

        Ok(posts
            .into_iter()
            .map(|record| PostWithComments {
                comments_count: counts.get(&record.post.id).copied().unwrap_or(0),
                record,
            })
            .collect())
    }

    /// `fetch` followed by `with_comments_count`.
    pub fn fetch_with_comments_count(&self, query: &PostQuery) -> Result<Vec<PostWithComments>> {
        let posts = self.fetch(query)?;
        self.with_comments_count(posts)
    }

    /// Validates and stores a post with its tags in one transaction.
    pub fn create(&self, input: NewPost) -> Result<i64> {
        let mut conn = self.db.get()?;
        let tx = conn.transaction()?;
        let post_id = insert_post(&tx, input)?;
        tx.commit()?;
        Ok(post_id)
    }

    /// Records that `user_id` likes the post. Returns false when the like
    /// already existed.
    pub fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        insert_like(&*self.db.get()?, post_id, user_id)
    }

    pub fn id_by_slug(&self, slug: &str) -> Result<Option<i64>> {
        find_id_by_slug(&*self.db.get()?, slug)
    }

    /// Deletes the post; its comments, likes and tag links go with it.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.get()?;
        conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
        Ok(())
    }
}
