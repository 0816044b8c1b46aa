use crate::config::{Config, MediaConfig};
use crate::models::{CommentWithAuthor, PostRecord, PostWithComments, TagWithCount};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedTag {
    pub title: String,
    pub posts_with_tag: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedPost {
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub comments_amount: i64,
    pub image_url: Option<String>,
    pub published_at: String,
    pub slug: String,
    pub tags: Vec<SerializedTag>,
    /// `None` for a post without tags.
    pub first_tag_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedComment {
    pub text: String,
    pub published_at: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedPostDetail {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<SerializedComment>,
    pub likes_amount: i64,
    pub image_url: Option<String>,
    pub published_at: String,
    pub slug: String,
    pub tags: Vec<SerializedTag>,
}

pub fn serialize_tag(tag: &TagWithCount) -> SerializedTag {
    SerializedTag {
        title: tag.tag.title.clone(),
        posts_with_tag: tag.posts_count,
    }
}

pub fn serialize_comment(comment: &CommentWithAuthor) -> SerializedComment {
    SerializedComment {
        text: comment.comment.text.clone(),
        published_at: comment.comment.published_at.clone(),
        author: comment.author.username.clone(),
    }
}

/// First `len` characters of `text`.
pub fn teaser(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}

/// Turns post records into the flat structures handed to templates.
#[derive(Debug, Clone)]
pub struct PostSerializer {
    media_url_prefix: String,
    teaser_length: usize,
}

impl PostSerializer {
    pub fn new(media: &MediaConfig, teaser_length: usize) -> Self {
        Self {
            media_url_prefix: media.url_prefix.clone(),
            teaser_length,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.media, config.listing.teaser_length)
    }

    pub fn image_url(&self, image: Option<&str>) -> Option<String> {
        let image = image.map(str::trim).filter(|i| !i.is_empty())?;
        if image.starts_with("http://") || image.starts_with("https://") {
            return Some(image.to_string());
        }
        Some(format!(
            "{}/{}",
            self.media_url_prefix.trim_end_matches('/'),
            image.trim_start_matches('/')
        ))
    }

    pub fn post(&self, post: &PostWithComments) -> SerializedPost {
        let record = &post.record;
        SerializedPost {
            title: record.post.title.clone(),
            teaser_text: teaser(&record.post.text, self.teaser_length),
            author: author_name(record),
            comments_amount: post.comments_count,
            image_url: self.image_url(record.post.image.as_deref()),
            published_at: record.post.published_at.clone(),
            slug: record.post.slug.clone(),
            tags: record.tags.iter().map(serialize_tag).collect(),
            first_tag_title: record.tags.first().map(|t| t.tag.title.clone()),
        }
    }

    pub fn posts(&self, posts: &[PostWithComments]) -> Vec<SerializedPost> {
        posts.iter().map(|p| self.post(p)).collect()
    }

    pub fn detail(&self, record: &PostRecord, comments: &[CommentWithAuthor]) -> SerializedPostDetail {
        SerializedPostDetail {
            title: record.post.title.clone(),
            text: record.post.text.clone(),
            author: author_name(record),
            comments: comments.iter().map(serialize_comment).collect(),
            likes_amount: record.likes_count,
            image_url: self.image_url(record.post.image.as_deref()),
            published_at: record.post.published_at.clone(),
            slug: record.post.slug.clone(),
            tags: record.tags.iter().map(serialize_tag).collect(),
        }
    }
}

fn author_name(record: &PostRecord) -> String {
    record
        .author
        .as_ref()
        .map(|a| a.username.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, Post, Tag, UserSummary};

    fn serializer() -> PostSerializer {
        PostSerializer::new(
            &MediaConfig {
                url_prefix: "/media/".to_string(),
            },
            200,
        )
    }

    fn record(text: &str, image: Option<&str>, tags: &[(&str, i64)]) -> PostRecord {
        PostRecord {
            post: Post {
                id: 1,
                title: "Hello".to_string(),
                text: text.to_string(),
                slug: "hello".to_string(),
                image: image.map(String::from),
                published_at: "2024-05-01T10:00:00Z".to_string(),
                author_id: 3,
            },
            likes_count: 4,
            author: Some(UserSummary {
                id: 3,
                username: "editor".to_string(),
            }),
            tags: tags
                .iter()
                .enumerate()
                .map(|(i, (title, count))| TagWithCount {
                    tag: Tag {
                        id: i as i64 + 1,
                        title: title.to_string(),
                    },
                    posts_count: *count,
                })
                .collect(),
        }
    }

    #[test]
    fn test_post_fields() {
        let post = PostWithComments {
            record: record("Body", Some("cover.jpg"), &[("go", 1), ("python", 4)]),
            comments_count: 2,
        };
        let serialized = serializer().post(&post);

        assert_eq!(serialized.title, "Hello");
        assert_eq!(serialized.teaser_text, "Body");
        assert_eq!(serialized.author, "editor");
        assert_eq!(serialized.comments_amount, 2);
        assert_eq!(serialized.image_url.as_deref(), Some("/media/cover.jpg"));
        assert_eq!(serialized.slug, "hello");
        assert_eq!(serialized.first_tag_title.as_deref(), Some("go"));
        assert_eq!(
            serialized.tags[1],
            SerializedTag {
                title: "python".to_string(),
                posts_with_tag: 4
            }
        );
    }

    #[test]
    fn test_post_without_tags_has_null_first_tag() {
        let post = PostWithComments {
            record: record("Body", None, &[]),
            comments_count: 0,
        };
        let serialized = serializer().post(&post);
        assert_eq!(serialized.first_tag_title, None);
        assert!(serialized.tags.is_empty());
        assert_eq!(serialized.image_url, None);
        assert_eq!(serialized.comments_amount, 0);

        let json = serde_json::to_value(&serialized).unwrap();
        assert!(json["first_tag_title"].is_null());
        assert_eq!(json["comments_amount"], 0);
    }

    #[test]
    fn test_teaser_counts_characters() {
        let text = "ж".repeat(250);
        let post = PostWithComments {
            record: record(&text, None, &[]),
            comments_count: 0,
        };
        let serialized = serializer().post(&post);
        assert_eq!(serialized.teaser_text.chars().count(), 200);
        assert_eq!(teaser("short", 200), "short");
    }

    #[test]
    fn test_image_url_variants() {
        let s = serializer();
        assert_eq!(s.image_url(Some("/a/b.png")).as_deref(), Some("/media/a/b.png"));
        assert_eq!(
            s.image_url(Some("https://cdn.example.com/x.png")).as_deref(),
            Some("https://cdn.example.com/x.png")
        );
        assert_eq!(s.image_url(Some("  ")), None);
    }

    #[test]
    fn test_detail_includes_comments_and_likes() {
        let comments = vec![CommentWithAuthor {
            comment: Comment {
                id: 1,
                post_id: 1,
                author_id: 9,
                text: "Nice".to_string(),
                published_at: "2024-05-02T10:00:00Z".to_string(),
            },
            author: UserSummary {
                id: 9,
                username: "reader".to_string(),
            },
        }];
        let detail = serializer().detail(&record("Full body", None, &[("rust", 2)]), &comments);

        assert_eq!(detail.text, "Full body");
        assert_eq!(detail.likes_amount, 4);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].author, "reader");
        assert_eq!(detail.tags[0].posts_with_tag, 2);
    }
}
