use super::{TagWithCount, UserSummary};
use serde::{Deserialize, Serialize};

pub const MAX_POST_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: Option<String>,
    pub published_at: String,
    pub author_id: i64,
}

/// A post with its like count, author and tags loaded.
///
/// Each tag carries its own post count so rendering a tag never needs
/// another query.
#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    #[serde(flatten)]
    pub post: Post,
    pub likes_count: i64,
    pub author: Option<UserSummary>,
    pub tags: Vec<TagWithCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub record: PostRecord,
    pub comments_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub text: String,
    pub image: Option<String>,
    pub published_at: Option<String>,
    pub author_id: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}
