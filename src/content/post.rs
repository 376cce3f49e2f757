//! Post, page and taxonomy models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cover used when a post or page does not declare one
pub const DEFAULT_COVER: &str = "/images/default-cover.jpg";

/// Fields shared by every routable piece of content
pub trait ContentRecord {
    fn slug(&self) -> &str;
    fn permalink(&self) -> &str;
    fn date(&self) -> DateTime<Utc>;
    fn updated(&self) -> Option<DateTime<Utc>>;

    /// Timestamp used for "recently updated" ordering
    fn freshness(&self) -> DateTime<Utc> {
        self.updated().unwrap_or_else(|| self.date())
    }
}

/// Named grouping of posts addressable by name or slug
pub trait Taxonomy {
    fn name(&self) -> &str;
    fn slug(&self) -> &str;
    fn permalink(&self) -> &str;
}

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// URL-friendly identifier, unique among posts
    pub slug: String,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Last updated date
    pub updated: Option<DateTime<Utc>>,

    /// Whether comments are enabled
    pub comments: bool,

    /// Tag names
    pub tags: Vec<String>,

    /// Category name
    pub category: String,

    /// Hand-written summary, may be empty
    pub summary: String,

    /// Cover image path
    pub cover: String,

    /// Whether the post is published
    pub published: bool,

    /// Plain-text teaser
    pub excerpt: String,

    /// Raw markdown body
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Site-relative URL
    pub permalink: String,

    /// Source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, slug: String, date: DateTime<Utc>, category: String) -> Self {
        let permalink = format!("/posts/{}", slug);
        Self {
            title,
            slug,
            date,
            updated: None,
            comments: true,
            tags: Vec::new(),
            category,
            summary: String::new(),
            cover: DEFAULT_COVER.to_string(),
            published: true,
            excerpt: String::new(),
            raw: String::new(),
            content: String::new(),
            permalink,
            source: PathBuf::new(),
        }
    }

    /// Summary if one was written, otherwise the excerpt
    pub fn description(&self) -> &str {
        if self.summary.is_empty() {
            &self.excerpt
        } else {
            &self.summary
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

impl ContentRecord for Post {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}

/// A standalone page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub comments: bool,
    pub cover: String,
    pub published: bool,
    /// Page lists friend links
    pub friend: bool,
    pub excerpt: String,
    pub raw: String,
    pub content: String,
    pub permalink: String,
    #[serde(skip)]
    pub source: PathBuf,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, slug: String, date: DateTime<Utc>) -> Self {
        let permalink = format!("/{}", slug);
        Self {
            title,
            slug,
            date,
            updated: None,
            comments: true,
            cover: DEFAULT_COVER.to_string(),
            published: true,
            friend: false,
            excerpt: String::new(),
            raw: String::new(),
            content: String::new(),
            permalink,
            source: PathBuf::new(),
        }
    }
}

impl ContentRecord for Page {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }

    fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}

/// A tag declared in tags/index.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(skip_deserializing)]
    pub permalink: String,
    /// Published posts carrying this tag
    #[serde(skip_deserializing)]
    pub count: usize,
}

impl Tag {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            permalink: format!("/tags/{}", slug),
            count: 0,
        }
    }

    /// Fill in fields derived from the slug after deserializing
    pub(crate) fn with_permalink(mut self) -> Self {
        self.permalink = format!("/tags/{}", self.slug);
        self
    }
}

impl Taxonomy for Tag {
    fn name(&self) -> &str {
        &self.name
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }
}

/// A category declared in categories/*.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(skip_deserializing)]
    pub permalink: String,
    /// Published posts in this category
    #[serde(skip_deserializing)]
    pub count: usize,
}

impl Category {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            cover: None,
            permalink: format!("/cats/{}", slug),
            count: 0,
        }
    }

    pub(crate) fn with_permalink(mut self) -> Self {
        self.permalink = format!("/cats/{}", self.slug);
        self
    }
}

impl Taxonomy for Category {
    fn name(&self) -> &str {
        &self.name
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_permalinks() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let post = Post::new("Hello".into(), "hello".into(), date, "Notes".into());
        assert_eq!(post.permalink, "/posts/hello");

        let page = Page::new("About".into(), "about".into(), date);
        assert_eq!(page.permalink, "/about");

        assert_eq!(Tag::new("Rust", "rust").permalink, "/tags/rust");
        assert_eq!(Category::new("Notes", "notes").permalink, "/cats/notes");
    }

    #[test]
    fn test_freshness_prefers_updated() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut post = Post::new("Hello".into(), "hello".into(), date, "Notes".into());
        assert_eq!(post.freshness(), date);

        post.updated = Some(later);
        assert_eq!(post.freshness(), later);
    }

    #[test]
    fn test_description_falls_back_to_excerpt() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let mut post = Post::new("Hello".into(), "hello".into(), date, "Notes".into());
        post.excerpt = "from the body".into();
        assert_eq!(post.description(), "from the body");

        post.summary = "written by hand".into();
        assert_eq!(post.description(), "written by hand");
    }

    #[test]
    fn test_deserialized_tag_gets_permalink() {
        let tag: Tag = serde_yaml::from_str("name: 随笔\nslug: essay\n").unwrap();
        let tag = tag.with_permalink();
        assert_eq!(tag.permalink, "/tags/essay");
        assert_eq!(tag.count, 0);
    }
}
