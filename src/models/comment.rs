use super::UserSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: Option<String>,
}
