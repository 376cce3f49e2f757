//! Immutable content snapshot
//!
//! [`ContentStore::build`] turns freshly loaded content into the read-only
//! collections every request works from: drafts filtered out, uniqueness
//! enforced, taxonomy counts filled in and posts sorted. Nothing mutates a
//! store afterwards; a reload builds a new one.

use indexmap::IndexSet;
use std::collections::HashSet;

use crate::config::{SiteConfig, SortOrder};
use crate::content::slug::{validate_slug, RESERVED_PAGE_SLUGS, RESERVED_POST_SLUGS};
use crate::content::{
    Category, ContentRecord, LoadedContent, Page, Post, Tag, Taxonomy, DEFAULT_COVER,
};
use crate::error::{QueryError, StoreError};
use crate::query::find_by_name_or_slug;

/// How many featured posts the home page shows
const MAX_FEATURED: usize = 3;

/// Content problems that do not prevent serving
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Category names used by posts but not declared
    pub missing_categories: Vec<String>,
    /// Tag names used by posts but not declared
    pub missing_tags: Vec<String>,
    /// Slugs of posts still on the default cover
    pub missing_covers: Vec<String>,
    /// Featured slugs that match no published post
    pub invalid_features: Vec<String>,
    /// Pinned category names that match no category
    pub invalid_pinned: Vec<String>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.missing_categories.is_empty()
            && self.missing_tags.is_empty()
            && self.missing_covers.is_empty()
            && self.invalid_features.is_empty()
            && self.invalid_pinned.is_empty()
    }

    fn log(&self) {
        if !self.missing_categories.is_empty() {
            tracing::warn!("Categories not configured: {:?}", self.missing_categories);
        }
        if !self.missing_tags.is_empty() {
            tracing::warn!("Tags not configured: {:?}", self.missing_tags);
        }
        if !self.missing_covers.is_empty() {
            tracing::debug!(
                "{} posts have no cover: {:?}",
                self.missing_covers.len(),
                self.missing_covers
            );
        }
        if !self.invalid_features.is_empty() {
            tracing::warn!("Invalid featured posts: {:?}", self.invalid_features);
        }
        if !self.invalid_pinned.is_empty() {
            tracing::warn!("Invalid pinned categories: {:?}", self.invalid_pinned);
        }
    }
}

/// Read-only collections of all published content
#[derive(Debug, Clone)]
pub struct ContentStore {
    posts: Vec<Post>,
    pages: Vec<Page>,
    tags: Vec<Tag>,
    categories: Vec<Category>,
    /// Indices into `posts`, in configured order
    featured: Vec<usize>,
    /// Indices into `categories`, in configured order
    pinned: Vec<usize>,
    diagnostics: Diagnostics,
}

impl ContentStore {
    /// Validate, count and order loaded content into a snapshot
    pub fn build(config: &SiteConfig, content: LoadedContent) -> Result<Self, StoreError> {
        let LoadedContent {
            mut posts,
            mut pages,
            mut tags,
            mut categories,
        } = content;

        if !config.include_drafts {
            posts.retain(|p| p.published);
            pages.retain(|p| p.published);
        }

        for post in &posts {
            validate_slug("posts", &post.slug, RESERVED_POST_SLUGS)?;
        }
        for page in &pages {
            validate_slug("pages", &page.slug, RESERVED_PAGE_SLUGS)?;
        }
        for tag in &tags {
            validate_slug("tags", &tag.slug, &[])?;
        }
        for category in &categories {
            validate_slug("categories", &category.slug, &[])?;
        }

        ensure_unique("posts", "slug", posts.iter().map(|p| p.slug.as_str()))?;
        ensure_unique("pages", "slug", pages.iter().map(|p| p.slug.as_str()))?;
        ensure_unique("tags", "slug", tags.iter().map(|t| t.slug.as_str()))?;
        ensure_unique("tags", "name", tags.iter().map(|t| t.name.as_str()))?;
        ensure_unique("categories", "slug", categories.iter().map(|c| c.slug.as_str()))?;
        ensure_unique("categories", "name", categories.iter().map(|c| c.name.as_str()))?;

        for category in &mut categories {
            category.count = posts.iter().filter(|p| p.category == category.name).count();
        }
        for tag in &mut tags {
            tag.count = posts.iter().filter(|p| p.has_tag(&tag.name)).count();
        }

        // Stable sort keeps load order for equal dates
        match config.post.sort {
            SortOrder::Desc => posts.sort_by(|a, b| b.date.cmp(&a.date)),
            SortOrder::Asc => posts.sort_by(|a, b| a.date.cmp(&b.date)),
        }

        let mut diagnostics = Diagnostics::default();

        let missing_categories: IndexSet<&str> = posts
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| !categories.iter().any(|cat| cat.name == *c))
            .collect();
        diagnostics.missing_categories = missing_categories.into_iter().map(String::from).collect();

        let missing_tags: IndexSet<&str> = posts
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .filter(|t| !tags.iter().any(|tag| tag.name == *t))
            .collect();
        diagnostics.missing_tags = missing_tags.into_iter().map(String::from).collect();

        diagnostics.missing_covers = posts
            .iter()
            .filter(|p| p.cover == DEFAULT_COVER)
            .map(|p| p.slug.clone())
            .collect();

        let mut featured = Vec::new();
        for slug in &config.post.feature {
            match posts.iter().position(|p| &p.slug == slug) {
                Some(idx) => featured.push(idx),
                None => diagnostics.invalid_features.push(slug.clone()),
            }
        }

        let mut pinned = Vec::new();
        for name in &config.post.category {
            match categories.iter().position(|c| &c.name == name) {
                Some(idx) => pinned.push(idx),
                None => diagnostics.invalid_pinned.push(name.clone()),
            }
        }

        diagnostics.log();

        Ok(Self {
            posts,
            pages,
            tags,
            categories,
            featured,
            pinned,
            diagnostics,
        })
    }

    /// All published posts in configured order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn post(&self, slug: &str) -> Result<&Post, QueryError> {
        self.posts
            .iter()
            .find(|p| p.slug == slug)
            .ok_or(QueryError::NotFound)
    }

    pub fn page(&self, slug: &str) -> Result<&Page, QueryError> {
        self.pages
            .iter()
            .find(|p| p.slug == slug)
            .ok_or(QueryError::NotFound)
    }

    /// Resolve a tag by name or slug
    pub fn tag(&self, name: Option<&str>, slug: Option<&str>) -> Result<&Tag, QueryError> {
        find_by_name_or_slug(&self.tags, name, slug)
    }

    /// Resolve a category by name or slug
    pub fn category(
        &self,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> Result<&Category, QueryError> {
        find_by_name_or_slug(&self.categories, name, slug)
    }

    pub fn posts_in_category(&self, category: &Category) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| p.category == category.name())
            .collect()
    }

    pub fn posts_with_tag(&self, tag: &Tag) -> Vec<&Post> {
        self.posts.iter().filter(|p| p.has_tag(tag.name())).collect()
    }

    /// Featured posts in configured order, at most three
    pub fn featured_posts(&self) -> Vec<&Post> {
        self.featured
            .iter()
            .take(MAX_FEATURED)
            .map(|&idx| &self.posts[idx])
            .collect()
    }

    pub fn pinned_categories(&self) -> Vec<&Category> {
        self.pinned.iter().map(|&idx| &self.categories[idx]).collect()
    }

    /// Posts just before and after `post` in listing order
    pub fn adjacent(&self, post: &Post) -> (Option<&Post>, Option<&Post>) {
        let Some(pos) = self.posts.iter().position(|p| p.slug == post.slug) else {
            return (None, None);
        };
        let prev = pos.checked_sub(1).map(|i| &self.posts[i]);
        let next = self.posts.get(pos + 1);
        (prev, next)
    }

    /// Most recently written or updated posts
    pub fn recent_posts(&self, limit: usize) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.freshness().cmp(&a.freshness()));
        posts.truncate(limit);
        posts
    }

    /// Most used tags, ties in declaration order
    pub fn top_tags(&self, limit: usize) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.iter().filter(|t| t.count > 0).collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count));
        tags.truncate(limit);
        tags
    }
}

fn ensure_unique<'a>(
    collection: &'static str,
    field: &'static str,
    values: impl Iterator<Item = &'a str>,
) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(StoreError::Duplicate {
                collection,
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(slug: &str, day: u32, category: &str, tags: &[&str]) -> Post {
        let date = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        let mut post = Post::new(slug.to_uppercase(), slug.into(), date, category.into());
        post.tags = tags.iter().map(|t| t.to_string()).collect();
        post.cover = "/images/cover.jpg".into();
        post
    }

    fn content() -> LoadedContent {
        LoadedContent {
            posts: vec![
                post("first", 1, "随笔", &["life"]),
                post("third", 3, "编程", &["rust", "life"]),
                post("second", 2, "编程", &["rust"]),
            ],
            pages: vec![Page::new(
                "About".into(),
                "about".into(),
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            )],
            tags: vec![Tag::new("rust", "rust"), Tag::new("life", "life")],
            categories: vec![Category::new("随笔", "notes"), Category::new("编程", "code")],
        }
    }

    fn slugs(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_sorted_newest_first_by_default() {
        let store = ContentStore::build(&SiteConfig::default(), content()).unwrap();
        let order: Vec<_> = store.posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_sorted_oldest_first() {
        let mut config = SiteConfig::default();
        config.post.sort = SortOrder::Asc;
        let store = ContentStore::build(&config, content()).unwrap();
        let order: Vec<_> = store.posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_counts_and_filters() {
        let store = ContentStore::build(&SiteConfig::default(), content()).unwrap();

        let code = store.category(None, Some("code")).unwrap();
        assert_eq!(code.count, 2);
        assert_eq!(slugs(&store.posts_in_category(code)), vec!["third", "second"]);

        let life = store.tag(Some("life"), None).unwrap();
        assert_eq!(life.count, 2);
        assert_eq!(slugs(&store.posts_with_tag(life)), vec!["third", "first"]);
    }

    #[test]
    fn test_drafts_are_dropped_unless_included() {
        let mut loaded = content();
        loaded.posts[0].published = false;
        let store = ContentStore::build(&SiteConfig::default(), loaded).unwrap();
        assert!(store.post("first").is_err());
        assert_eq!(store.category(Some("随笔"), None).unwrap().count, 0);

        let mut loaded = content();
        loaded.posts[0].published = false;
        let config = SiteConfig {
            include_drafts: true,
            ..Default::default()
        };
        let store = ContentStore::build(&config, loaded).unwrap();
        assert!(store.post("first").is_ok());
    }

    #[test]
    fn test_duplicate_slug_fails_build() {
        let mut loaded = content();
        loaded.posts.push(post("first", 9, "随笔", &[]));
        let err = ContentStore::build(&SiteConfig::default(), loaded).unwrap_err();
        assert_eq!(
            err,
            StoreError::Duplicate {
                collection: "posts",
                field: "slug",
                value: "first".into()
            }
        );
    }

    #[test]
    fn test_duplicate_tag_name_fails_build() {
        let mut loaded = content();
        loaded.tags.push(Tag::new("rust", "rust-lang"));
        assert!(matches!(
            ContentStore::build(&SiteConfig::default(), loaded),
            Err(StoreError::Duplicate { field: "name", .. })
        ));
    }

    #[test]
    fn test_reserved_page_slug_fails_build() {
        let mut loaded = content();
        loaded.pages[0].slug = "cats".into();
        assert!(matches!(
            ContentStore::build(&SiteConfig::default(), loaded),
            Err(StoreError::ReservedSlug { .. })
        ));
    }

    #[test]
    fn test_diagnostics() {
        let mut loaded = content();
        loaded.posts.push(post("fourth", 4, "旅行", &["travel", "rust", "travel"]));
        loaded.posts[0].cover = DEFAULT_COVER.into();

        let mut config = SiteConfig::default();
        config.post.feature = vec!["third".into(), "gone".into()];
        config.post.category = vec!["编程".into(), "不存在".into()];

        let store = ContentStore::build(&config, loaded).unwrap();
        let diagnostics = store.diagnostics();
        assert_eq!(diagnostics.missing_categories, vec!["旅行"]);
        assert_eq!(diagnostics.missing_tags, vec!["travel"]);
        assert_eq!(diagnostics.missing_covers, vec!["first"]);
        assert_eq!(diagnostics.invalid_features, vec!["gone"]);
        assert_eq!(diagnostics.invalid_pinned, vec!["不存在"]);
        assert!(!diagnostics.is_empty());

        assert_eq!(slugs(&store.featured_posts()), vec!["third"]);
        let pinned: Vec<_> = store.pinned_categories().iter().map(|c| c.slug.clone()).collect();
        assert_eq!(pinned, vec!["code"]);
    }

    #[test]
    fn test_featured_posts_capped() {
        let mut loaded = content();
        loaded.posts.push(post("fourth", 4, "随笔", &[]));
        let mut config = SiteConfig::default();
        config.post.feature = vec![
            "first".into(),
            "fourth".into(),
            "second".into(),
            "third".into(),
        ];
        let store = ContentStore::build(&config, loaded).unwrap();
        assert_eq!(slugs(&store.featured_posts()), vec!["first", "fourth", "second"]);
    }

    #[test]
    fn test_adjacent_recent_and_top_tags() {
        let mut loaded = content();
        loaded.posts[0].updated = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let store = ContentStore::build(&SiteConfig::default(), loaded).unwrap();

        let second = store.post("second").unwrap();
        let (prev, next) = store.adjacent(second);
        assert_eq!(prev.map(|p| p.slug.as_str()), Some("third"));
        assert_eq!(next.map(|p| p.slug.as_str()), Some("first"));

        let (prev, _) = store.adjacent(store.post("third").unwrap());
        assert!(prev.is_none());

        // "first" was updated most recently
        assert_eq!(slugs(&store.recent_posts(2)), vec!["first", "third"]);

        let top: Vec<_> = store.top_tags(5).iter().map(|t| t.slug.clone()).collect();
        assert_eq!(top, vec!["rust", "life"]);
    }

    #[test]
    fn test_page_lookup() {
        let store = ContentStore::build(&SiteConfig::default(), content()).unwrap();
        assert_eq!(store.page("about").unwrap().permalink, "/about");
        assert_eq!(store.page("missing").unwrap_err(), QueryError::NotFound);
    }
}
