//! Site configuration (_config.yml)

use anyhow::{bail, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub website: String,
    pub keywords: Vec<String>,
    pub author: AuthorConfig,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Date / Time
    pub timezone: String,
    pub time_format: String,

    // Writing
    pub include_drafts: bool,
    pub post: PostConfig,

    // Pagination
    pub pagination: PaginationConfig,

    // Syndication
    pub feed: FeedConfig,

    pub sidebar: SidebarConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            website: "http://localhost:4000".to_string(),
            keywords: Vec::new(),
            author: AuthorConfig::default(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            timezone: "Asia/Shanghai".to_string(),
            time_format: "%Y-%m-%d".to_string(),

            include_drafts: false,
            post: PostConfig::default(),

            pagination: PaginationConfig::default(),

            feed: FeedConfig::default(),

            sidebar: SidebarConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the query layer cannot work with
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("pagination.posts", self.pagination.posts),
            ("pagination.category", self.pagination.category),
            ("pagination.tags", self.pagination.tags),
            ("pagination.search", self.pagination.search),
        ];
        for (key, size) in sizes {
            if size == 0 {
                bail!("{} must be greater than zero", key);
            }
        }

        self.tz()?;
        Ok(())
    }

    /// Parsed site timezone
    pub fn tz(&self) -> Result<Tz> {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => Ok(tz),
            Err(e) => bail!("Unknown timezone {:?}: {}", self.timezone, e),
        }
    }

    /// Website root without a trailing slash
    pub fn base_url(&self) -> &str {
        self.website.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
    pub url: String,
}

/// Post ordering in every listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub sort: SortOrder,
    /// Slugs of posts featured on the home page
    pub feature: Vec<String>,
    /// Category names pinned below the home listing
    pub category: Vec<String>,
}

/// Page sizes per listing kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub posts: usize,
    pub category: usize,
    pub tags: usize,
    pub search: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            posts: 5,
            category: 7,
            tags: 7,
            search: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Embed the full rendered post in each item
    pub full: bool,
    pub size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            full: true,
            size: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    pub post: usize,
    pub tag: usize,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self { post: 6, tag: 20 }
    }
}
