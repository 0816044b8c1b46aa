//! Bulk loading of blog content from a TOML fixture.
//!
//! ```toml
//! [[users]]
//! username = "editor"
//! staff = true
//!
//! [[posts]]
//! title = "Hello"
//! text = "First post"
//! author = "editor"
//! tags = ["News"]
//! liked_by = ["alice", "bob"]
//!
//! [[comments]]
//! post = "hello"
//! author = "alice"
//! text = "Welcome!"
//! ```

use crate::models::{NewComment, NewPost};
use crate::services::slug::generate_slug;
use crate::services::{comments, posts, tags, users, BlogError};
use crate::Database;
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    #[serde(default)]
    pub tags: Vec<FixtureTag>,
    #[serde(default)]
    pub posts: Vec<FixturePost>,
    #[serde(default)]
    pub comments: Vec<FixtureComment>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureUser {
    pub username: String,
    #[serde(default)]
    pub staff: bool,
}

#[derive(Debug, Deserialize)]
pub struct FixtureTag {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct FixturePost {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub text: String,
    pub image: Option<String>,
    pub published_at: Option<String>,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub liked_by: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureComment {
    /// Slug of the commented post.
    pub post: String,
    pub author: String,
    pub text: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub users: usize,
    pub tags: usize,
    pub posts: usize,
    pub skipped_posts: usize,
    pub likes: usize,
    pub comments: usize,
}

impl Fixture {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads `fixture` into `db` inside a single transaction, so a failing
/// record leaves the database untouched. Posts whose slug already exists are
/// skipped together with their likes and comments.
pub fn import(db: &Database, fixture: &Fixture) -> Result<ImportReport> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;
    let report = import_records(&tx, fixture)?;
    tx.commit()?;
    Ok(report)
}

fn import_records(conn: &Connection, fixture: &Fixture) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for user in &fixture.users {
        match users::find_by_username(conn, &user.username)? {
            Some(existing) => {
                if existing.is_staff != user.staff {
                    users::update_staff(conn, &user.username, user.staff)?;
                }
            }
            None => {
                users::insert_user(conn, &user.username, user.staff)?;
                report.users += 1;
            }
        }
    }

    for tag in &fixture.tags {
        let (_, created) = tags::insert_tag(conn, &tag.title)?;
        if created {
            report.tags += 1;
        }
    }

    let mut imported_slugs = HashSet::new();
    let mut skipped_slugs = HashSet::new();
    for post in &fixture.posts {
        let slug = post
            .slug
            .clone()
            .unwrap_or_else(|| generate_slug(&post.title));
        if posts::find_id_by_slug(conn, &slug)?.is_some() {
            tracing::info!("Skipping existing post '{}'", slug);
            if !imported_slugs.contains(&slug) {
                skipped_slugs.insert(slug);
            }
            report.skipped_posts += 1;
            continue;
        }

        let author = users::find_by_username(conn, &post.author)?
            .ok_or_else(|| BlogError::UnknownUser(post.author.clone()))?;

        let post_id = posts::insert_post(
            conn,
            NewPost {
                title: post.title.clone(),
                slug: Some(slug.clone()),
                text: post.text.clone(),
                image: post.image.clone(),
                published_at: post.published_at.clone(),
                author_id: author.id,
                tags: post.tags.clone(),
            },
        )
        .with_context(|| format!("importing post '{}'", slug))?;
        imported_slugs.insert(slug);
        report.posts += 1;

        for liker in &post.liked_by {
            let user_id = users::get_or_insert_user(conn, liker, false)?;
            if posts::insert_like(conn, post_id, user_id)? {
                report.likes += 1;
            }
        }
    }

    for comment in &fixture.comments {
        if skipped_slugs.contains(&comment.post) {
            continue;
        }
        let post_id = posts::find_id_by_slug(conn, &comment.post)?
            .ok_or_else(|| BlogError::UnknownPost(comment.post.clone()))?;
        let author_id = users::get_or_insert_user(conn, &comment.author, false)?;

        comments::insert_comment(
            conn,
            NewComment {
                post_id,
                author_id,
                text: comment.text.clone(),
                published_at: comment.published_at.clone(),
            },
        )?;
        report.comments += 1;
    }

    Ok(report)
}
