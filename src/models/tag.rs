use serde::{Deserialize, Serialize};

pub const MAX_TAG_TITLE_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub title: String,
}

/// A tag annotated with the number of posts carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub posts_count: i64,
}

/// Canonical stored form of a tag title.
pub fn normalize_tag_title(title: &str) -> String {
    title.trim().to_lowercase()
}
