use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Sizes of the listings shown on every page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,
    #[serde(default = "default_fresh_limit")]
    pub fresh_limit: usize,
    #[serde(default = "default_tag_posts_limit")]
    pub tag_posts_limit: usize,
    #[serde(default = "default_teaser_length")]
    pub teaser_length: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            popular_limit: default_popular_limit(),
            fresh_limit: default_fresh_limit(),
            tag_posts_limit: default_tag_posts_limit(),
            teaser_length: default_teaser_length(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_url")]
    pub url_prefix: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_media_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pool_size() -> u32 {
    10
}

fn default_popular_limit() -> usize {
    5
}

fn default_fresh_limit() -> usize {
    5
}

fn default_tag_posts_limit() -> usize {
    20
}

fn default_teaser_length() -> usize {
    200
}

fn default_media_url() -> String {
    "/media/".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `sensive init` to create one.",
                path.display(),
                e
            )
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("listing.popular_limit", self.listing.popular_limit),
            ("listing.fresh_limit", self.listing.fresh_limit),
            ("listing.tag_posts_limit", self.listing.tag_posts_limit),
        ];
        for (name, value) in limits {
            if value == 0 || value > 100 {
                anyhow::bail!("{} must be between 1 and 100", name);
            }
        }
        if self.listing.teaser_length == 0 {
            anyhow::bail!("listing.teaser_length must be greater than 0");
        }
        if self.listing.teaser_length > 10000 {
            anyhow::bail!("listing.teaser_length must be 10000 or less");
        }
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        Ok(())
    }
}
