//! Content loader - reads posts, pages and taxonomies from the content directory

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{Category, FrontMatter, MarkdownRenderer, Page, Post, Tag, DEFAULT_COVER};
use crate::Site;

const MAX_TITLE_LEN: usize = 99;

/// Everything read from disk, before validation and sorting
#[derive(Debug, Default)]
pub struct LoadedContent {
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub tags: Vec<Tag>,
    pub categories: Vec<Category>,
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    tz: Tz,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self> {
        Ok(Self {
            site,
            tz: site.config.tz()?,
            renderer: MarkdownRenderer::new(),
        })
    }

    /// Load every collection
    pub fn load(&self) -> Result<LoadedContent> {
        let content = LoadedContent {
            posts: self.load_posts()?,
            pages: self.load_pages()?,
            tags: self.load_tags()?,
            categories: self.load_categories()?,
        };

        tracing::info!(
            "Loaded {} posts, {} pages, {} tags, {} categories",
            content.posts.len(),
            content.pages.len(),
            content.tags.len(),
            content.categories.len()
        );

        Ok(content)
    }

    /// Load all posts from content/posts, recursively
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.site.content_dir.join("posts");
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_post(path) {
                    Ok(post) => {
                        tracing::debug!("Loaded post {:?} from {:?}", post.slug, path);
                        posts.push(post);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {:#}", path, e);
                    }
                }
            }
        }

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let title = required_title(fm.title.as_deref())?;
        let slug = slug_or_stem(fm.slug.as_deref(), path)?;
        let date = fm
            .parse_date(self.tz)
            .ok_or_else(|| anyhow!("missing or unparsable `date`"))?;
        let category = fm
            .category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("missing `category`"))?;

        let mut post = Post::new(title, slug, date, category);
        post.updated = fm.parse_updated(self.tz);
        post.comments = fm.comments;
        post.tags = fm.tags;
        post.summary = fm.summary.unwrap_or_default();
        post.cover = fm.cover.unwrap_or_else(|| DEFAULT_COVER.to_string());
        post.published = fm.published;
        post.excerpt = MarkdownRenderer::excerpt(body);
        post.raw = body.to_string();
        post.content = self.renderer.render(body);
        post.source = path.to_path_buf();

        Ok(post)
    }

    /// Load standalone pages from content/pages
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let pages_dir = self.site.content_dir.join("pages");
        if !pages_dir.exists() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(&pages_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_page(path) {
                    Ok(page) => pages.push(page),
                    Err(e) => {
                        tracing::warn!("Failed to load page {:?}: {:#}", path, e);
                    }
                }
            }
        }

        Ok(pages)
    }

    /// Load a single page from a file
    fn load_page(&self, path: &Path) -> Result<Page> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let title = required_title(fm.title.as_deref())?;
        let slug = slug_or_stem(fm.slug.as_deref(), path)?;
        let date = fm
            .parse_date(self.tz)
            .ok_or_else(|| anyhow!("missing or unparsable `date`"))?;

        let mut page = Page::new(title, slug, date);
        page.updated = fm.parse_updated(self.tz);
        page.comments = fm.comments;
        page.cover = fm.cover.unwrap_or_else(|| DEFAULT_COVER.to_string());
        page.published = fm.published;
        page.friend = fm.friend;
        page.excerpt = MarkdownRenderer::excerpt(body);
        page.raw = body.to_string();
        page.content = self.renderer.render(body);
        page.source = path.to_path_buf();

        Ok(page)
    }

    /// Load tags from content/tags/index.yml
    pub fn load_tags(&self) -> Result<Vec<Tag>> {
        let path = self.site.content_dir.join("tags").join("index.yml");
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let tags: Vec<Tag> = serde_yaml::from_str::<Option<Vec<Tag>>>(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?
            .unwrap_or_default();

        Ok(tags.into_iter().map(Tag::with_permalink).collect())
    }

    /// Load categories, one per file in content/categories
    pub fn load_categories(&self) -> Result<Vec<Category>> {
        let dir = self.site.content_dir.join("categories");
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut categories = Vec::new();

        for entry in WalkDir::new(&dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_yaml_file(path) {
                let content = fs::read_to_string(path)?;
                let category: Category = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse {:?}", path))?;
                categories.push(category.with_permalink());
            }
        }

        Ok(categories)
    }
}

fn required_title(title: Option<&str>) -> Result<String> {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        bail!("missing `title`");
    }
    if title.chars().count() > MAX_TITLE_LEN {
        bail!("`title` is longer than {} characters", MAX_TITLE_LEN);
    }
    Ok(title.to_string())
}

/// Front-matter slug, or the file name when none is given
fn slug_or_stem(slug: Option<&str>, path: &Path) -> Result<String> {
    if let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(slug.to_string());
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a slug from {:?}", path))
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "mdx" || e == "markdown")
        .unwrap_or(false)
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}
