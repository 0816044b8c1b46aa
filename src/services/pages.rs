//! Page compositions: each page is a pure function of the stored data and
//! its path parameters, returning the context handed to the template.

use crate::config::{Config, ListingConfig};
use crate::services::comments::CommentRepository;
use crate::services::posts::{PostQuery, PostRepository};
use crate::services::serialize::{
    serialize_tag, PostSerializer, SerializedPost, SerializedPostDetail, SerializedTag,
};
use crate::services::tags::TagRepository;
use crate::Database;
use anyhow::Result;
use serde::Serialize;

/// The sidebar shared by every content page.
#[derive(Debug, Clone, Serialize)]
pub struct PopularPanels {
    pub most_popular_posts: Vec<SerializedPost>,
    pub popular_tags: Vec<SerializedTag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexContext {
    #[serde(flatten)]
    pub panels: PopularPanels,
    pub page_posts: Vec<SerializedPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    #[serde(flatten)]
    pub panels: PopularPanels,
    pub post: SerializedPostDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagFilterContext {
    #[serde(flatten)]
    pub panels: PopularPanels,
    pub tag: String,
    pub posts: Vec<SerializedPost>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactsContext {}

pub struct Pages<'a> {
    db: &'a Database,
    listing: &'a ListingConfig,
    serializer: PostSerializer,
}

impl<'a> Pages<'a> {
    pub fn new(db: &'a Database, config: &'a Config) -> Self {
        Self {
            db,
            listing: &config.listing,
            serializer: PostSerializer::from_config(config),
        }
    }

    fn posts(&self) -> PostRepository<'a> {
        PostRepository::new(self.db)
    }

    pub fn popular_panels(&self) -> Result<PopularPanels> {
        let popular = PostQuery::new().popular().limit(self.listing.popular_limit);
        let most_popular_posts = self.posts().fetch_with_comments_count(&popular)?;
        let popular_tags = TagRepository::new(self.db).popular(self.listing.popular_limit)?;

        Ok(PopularPanels {
            most_popular_posts: self.serializer.posts(&most_popular_posts),
            popular_tags: popular_tags.iter().map(serialize_tag).collect(),
        })
    }

    pub fn index(&self) -> Result<IndexContext> {
        let panels = self.popular_panels()?;
        let fresh = PostQuery::new().newest().limit(self.listing.fresh_limit);
        let page_posts = self.posts().fetch_with_comments_count(&fresh)?;

        Ok(IndexContext {
            panels,
            page_posts: self.serializer.posts(&page_posts),
        })
    }

    /// `None` when no post has `slug`.
    pub fn post_detail(&self, slug: &str) -> Result<Option<PostDetailContext>> {
        let Some(record) = self.posts().get_by_slug(slug)? else {
            tracing::debug!(slug, "post not found");
            return Ok(None);
        };

        let comments = CommentRepository::new(self.db).for_post(record.post.id)?;
        let post = self.serializer.detail(&record, &comments);

        Ok(Some(PostDetailContext {
            panels: self.popular_panels()?,
            post,
        }))
    }

    /// `None` when no tag has `tag_title` (compared case-insensitively).
    pub fn tag_filter(&self, tag_title: &str) -> Result<Option<TagFilterContext>> {
        let Some(tag) = TagRepository::new(self.db).get_by_title(tag_title)? else {
            tracing::debug!(tag_title, "tag not found");
            return Ok(None);
        };

        let related = PostQuery::new()
            .tagged(tag.id)
            .limit(self.listing.tag_posts_limit);
        let posts = self.posts().fetch_with_comments_count(&related)?;

        Ok(Some(TagFilterContext {
            panels: self.popular_panels()?,
            tag: tag.title,
            posts: self.serializer.posts(&posts),
        }))
    }

    pub fn contacts(&self) -> ContactsContext {
        ContactsContext::default()
    }
}
