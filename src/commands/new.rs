//! Create a new post or page

use anyhow::{bail, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::slug::{validate_slug, RESERVED_PAGE_SLUGS, RESERVED_POST_SLUGS};
use crate::Site;

/// What `folio new` should create
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    pub title: String,
    /// Defaults to the slugified title
    pub slug: Option<String>,
    /// Required for posts, ignored for pages
    pub category: Option<String>,
    /// Create a standalone page instead of a post
    pub page: bool,
}

#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    slug: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    published: bool,
}

/// Write a scaffold file and return its path
pub fn create(site: &Site, options: &NewOptions) -> Result<PathBuf> {
    let title = options.title.trim();
    if title.is_empty() {
        bail!("Title cannot be empty");
    }

    let slug = match &options.slug {
        Some(slug) => slug.clone(),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        bail!("Cannot derive a slug from {:?}, pass one with --slug", title);
    }

    let (dir, reserved) = if options.page {
        (site.content_dir.join("pages"), RESERVED_PAGE_SLUGS)
    } else {
        (site.content_dir.join("posts"), RESERVED_POST_SLUGS)
    };
    let collection = if options.page { "pages" } else { "posts" };
    validate_slug(collection, &slug, reserved)?;

    let category = match options.category.as_deref().map(str::trim) {
        _ if options.page => None,
        Some(category) if !category.is_empty() => Some(category),
        _ => bail!("Posts need a category, pass one with --category"),
    };

    let file_path = dir.join(format!("{}.md", slug));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let tz = site.config.tz()?;
    let date = Utc::now()
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let scaffold = if options.page {
        Scaffold {
            title,
            slug: &slug,
            date,
            category: None,
            tags: None,
            summary: None,
            published: true,
        }
    } else {
        Scaffold {
            title,
            slug: &slug,
            date,
            category,
            tags: Some(Vec::new()),
            summary: Some(""),
            published: true,
        }
    };

    let content = format!("---\n{}---\n\n", serde_yaml::to_string(&scaffold)?);

    fs::create_dir_all(&dir)?;
    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
