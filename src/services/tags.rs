use crate::models::{normalize_tag_title, Tag, TagWithCount, MAX_TAG_TITLE_LENGTH};
use crate::services::BlogError;
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

pub(crate) fn validated_title(title: &str) -> Result<String> {
    let title = normalize_tag_title(title);
    if title.is_empty() {
        return Err(BlogError::EmptyTagTitle.into());
    }
    if title.chars().count() > MAX_TAG_TITLE_LENGTH {
        return Err(BlogError::TagTitleTooLong {
            title,
            max: MAX_TAG_TITLE_LENGTH,
        }
        .into());
    }
    Ok(title)
}

fn row_to_tag_with_count(row: &rusqlite::Row) -> rusqlite::Result<TagWithCount> {
    Ok(TagWithCount {
        tag: Tag {
            id: row.get(0)?,
            title: row.get(1)?,
        },
        posts_count: row.get(2)?,
    })
}

/// Stores a tag under its lowercase title. Returns the tag id and whether a
/// new row was inserted.
pub(crate) fn insert_tag(conn: &Connection, title: &str) -> Result<(i64, bool)> {
    let title = validated_title(title)?;
    let inserted = conn.execute("INSERT OR IGNORE INTO tags (title) VALUES (?)", [&title])?;
    let id = conn.query_row("SELECT id FROM tags WHERE title = ?", [&title], |row| {
        row.get(0)
    })?;
    Ok((id, inserted > 0))
}

pub struct TagRepository<'a> {
    db: &'a Database,
}

impl<'a> TagRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Stores a tag under its lowercase title and returns its id.
    /// Creating an existing title returns the existing tag.
    pub fn create(&self, title: &str) -> Result<i64> {
        let (id, _) = insert_tag(&*self.db.get()?, title)?;
        Ok(id)
    }

    pub fn get_by_title(&self, title: &str) -> Result<Option<Tag>> {
        let title = normalize_tag_title(title);
        let conn = self.db.get()?;
        let tag = conn
            .query_row(
                "SELECT id, title FROM tags WHERE title = ?",
                [&title],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        title: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(tag)
    }

    pub fn list(&self) -> Result<Vec<Tag>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare("SELECT id, title FROM tags ORDER BY title")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Tags ordered by how many posts carry them, most used first.
    pub fn popular(&self, limit: usize) -> Result<Vec<TagWithCount>> {
        let conn = self.db.get()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.title, COUNT(pt.post_id) AS posts_count
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id
            ORDER BY posts_count DESC, t.title
            LIMIT ?
            "#,
        )?;
        let tags = stmt
            .query_map([limit], row_to_tag_with_count)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Tags of every listed post, each annotated with its own post count.
    /// One query for the whole batch; tags of a post are ordered by title.
    pub fn for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<TagWithCount>>> {
        let mut by_post: HashMap<i64, Vec<TagWithCount>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(by_post);
        }

        let placeholders = post_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            r#"
            SELECT pt.post_id, t.id, t.title, counts.posts_count
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            JOIN (SELECT tag_id, COUNT(*) AS posts_count FROM post_tags GROUP BY tag_id) counts
                ON counts.tag_id = t.id
            WHERE pt.post_id IN ({})
            ORDER BY pt.post_id, t.title
            "#,
            placeholders
        );

        let conn = self.db.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(post_ids), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                TagWithCount {
                    tag: Tag {
                        id: row.get(1)?,
                        title: row.get(2)?,
                    },
                    posts_count: row.get(3)?,
                },
            ))
        })?;

        for row in rows {
            let (post_id, tag) = row?;
            by_post.entry(post_id).or_default().push(tag);
        }
        Ok(by_post)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.db.get()?;
        conn.execute("DELETE FROM tags WHERE id = ?", [id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn setup_test_db() -> Database {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db = Database::open_memory(&format!("tags_test_{}", id)).unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_create_lowercases_title() {
        let db = setup_test_db();
        let tags = TagRepository::new(&db);
        tags.create("  Python ").unwrap();

        let tag = tags.get_by_title("python").unwrap().unwrap();
        assert_eq!(tag.title, "python");
        for tag in tags.list().unwrap() {
            assert_eq!(tag.title, tag.title.to_lowercase());
        }
    }

    #[test]
    fn test_create_is_idempotent_across_case() {
        let db = setup_test_db();
        let tags = TagRepository::new(&db);
        let first = tags.create("Rust").unwrap();
        let second = tags.create("RUST").unwrap();
        assert_eq!(first, second);
        assert_eq!(tags.list().unwrap().len(), 1);
    }

    #[test]
    fn test_lookup_normalizes_input() {
        let db = setup_test_db();
        let tags = TagRepository::new(&db);
        tags.create("go").unwrap();
        assert!(tags.get_by_title("Go").unwrap().is_some());
        assert!(tags.get_by_title("haskell").unwrap().is_none());
    }

    #[test]
    fn test_rejects_empty_and_long_titles() {
        let db = setup_test_db();
        let tags = TagRepository::new(&db);

        let err = tags.create("   ").unwrap_err();
        assert_eq!(err.downcast_ref::<BlogError>(), Some(&BlogError::EmptyTagTitle));

        let err = tags.create(&"x".repeat(21)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BlogError>(),
            Some(BlogError::TagTitleTooLong { max: 20, .. })
        ));
    }

    #[test]
    fn test_list_ordered_by_title() {
        let db = setup_test_db();
        let tags = TagRepository::new(&db);
        tags.create("zig").unwrap();
        tags.create("ada").unwrap();
        tags.create("nim").unwrap();

        let titles: Vec<String> = tags.list().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["ada", "nim", "zig"]);
    }

    #[test]
    fn test_popular_without_posts_has_zero_counts() {
        let db = setup_test_db();
        let tags = TagRepository::new(&db);
        tags.create("one").unwrap();
        tags.create("two").unwrap();

        let popular = tags.popular(5).unwrap();
        assert_eq!(popular.len(), 2);
        assert!(popular.iter().all(|t| t.posts_count == 0));
    }
}
