//! folio: content store, paginated queries and HTTP surface for a personal blog
//!
//! Markdown posts and pages plus YAML tag/category files are loaded once
//! into an immutable [`store::ContentStore`]; lookups and pagination are
//! pure functions over that snapshot, and [`server`] exposes them over HTTP
//! with the blog's canonical URL rules.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod helpers;
pub mod query;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::ContentLoader;
use store::ContentStore;

/// Name of the site configuration file inside the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog site on disk
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (posts, pages, taxonomies)
    pub content_dir: PathBuf,
    /// Static assets served as-is
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open a site directory with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Read all content and build a fresh snapshot
    pub fn load_store(&self) -> Result<ContentStore> {
        let content = ContentLoader::new(self)?.load()?;
        let store = ContentStore::build(&self.config, content)?;
        Ok(store)
    }

    /// Create a new post or page scaffold
    pub fn new_post(&self, options: &commands::new::NewOptions) -> Result<PathBuf> {
        commands::new::create(self, options)
    }
}
