//! JSON view models returned by the HTTP handlers

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{Category, Page, Post, Tag};
use crate::helpers::format_show_date;
use crate::query::{page_numbers, page_url, PageLink, Paginated};
use crate::store::ContentStore;

/// Site-wide metadata included in every view
#[derive(Debug, Serialize)]
pub struct SiteData<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub website: &'a str,
    pub author: &'a str,
}

impl<'a> SiteData<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            title: &config.title,
            description: &config.description,
            website: config.base_url(),
            author: &config.author.name,
        }
    }
}

/// A tag as shown on a post, linked when it is declared
#[derive(Debug, Serialize)]
pub struct TagLink<'a> {
    pub name: &'a str,
    pub permalink: Option<&'a str>,
}

fn tag_links<'a>(post: &'a Post, store: &'a ContentStore) -> Vec<TagLink<'a>> {
    post.tags
        .iter()
        .map(|name| TagLink {
            name,
            permalink: store.tag(Some(name.as_str()), None).ok().map(|t| t.permalink.as_str()),
        })
        .collect()
}

fn category_link<'a>(post: &'a Post, store: &'a ContentStore) -> Option<&'a str> {
    store
        .category(Some(post.category.as_str()), None)
        .ok()
        .map(|c| c.permalink.as_str())
}

/// Post card in a listing
#[derive(Debug, Serialize)]
pub struct PostSummary<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub permalink: &'a str,
    pub date: DateTime<Utc>,
    pub show_date: String,
    pub category: &'a str,
    pub category_link: Option<&'a str>,
    pub tags: Vec<TagLink<'a>>,
    pub description: &'a str,
    pub cover: &'a str,
}

impl<'a> PostSummary<'a> {
    pub fn new(
        post: &'a Post,
        store: &'a ContentStore,
        config: &SiteConfig,
        now: &DateTime<Utc>,
    ) -> Self {
        Self {
            title: &post.title,
            slug: &post.slug,
            permalink: &post.permalink,
            date: post.date,
            show_date: format_show_date(&post.date, now, config),
            category: &post.category,
            category_link: category_link(post, store),
            tags: tag_links(post, store),
            description: post.description(),
            cover: &post.cover,
        }
    }

    pub fn many(
        posts: &[&'a Post],
        store: &'a ContentStore,
        config: &SiteConfig,
        now: &DateTime<Utc>,
    ) -> Vec<Self> {
        posts
            .iter()
            .map(|post| Self::new(post, store, config, now))
            .collect()
    }
}

/// Minimal reference to a post, for navigation and sidebars
#[derive(Debug, Serialize)]
pub struct NavPost<'a> {
    pub title: &'a str,
    pub permalink: &'a str,
}

impl<'a> From<&'a Post> for NavPost<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            permalink: &post.permalink,
        }
    }
}

/// Entry of the page navigation bar
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageLinkData {
    Number {
        num: usize,
        current: bool,
        url: String,
    },
    Dots,
}

#[derive(Debug, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    pub per_page: usize,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
    pub links: Vec<PageLinkData>,
}

impl PaginationData {
    pub fn new<T>(page: &Paginated<'_, T>, root: &str) -> Self {
        let links = page_numbers(page.current, page.total_pages)
            .into_iter()
            .map(|link| match link {
                PageLink::Number { num, current } => PageLinkData::Number {
                    num,
                    current,
                    url: page_url(root, num),
                },
                PageLink::Dots => PageLinkData::Dots,
            })
            .collect();

        Self {
            current: page.current,
            total: page.total_pages,
            per_page: page.page_size,
            prev_link: page.has_prev().then(|| page_url(root, page.current - 1)),
            next_link: page.has_next().then(|| page_url(root, page.current + 1)),
            links,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SidebarData<'a> {
    pub recent: Vec<NavPost<'a>>,
    pub tags: Vec<&'a Tag>,
}

impl<'a> SidebarData<'a> {
    pub fn new(store: &'a ContentStore, config: &SiteConfig) -> Self {
        Self {
            recent: store
                .recent_posts(config.sidebar.post)
                .into_iter()
                .map(NavPost::from)
                .collect(),
            tags: store.top_tags(config.sidebar.tag),
        }
    }
}

/// Home page and its paginated continuation
#[derive(Debug, Serialize)]
pub struct HomeView<'a> {
    pub site: SiteData<'a>,
    pub pagination: PaginationData,
    pub posts: Vec<PostSummary<'a>>,
    pub featured: Vec<NavPost<'a>>,
    pub pinned_categories: Vec<&'a Category>,
    pub sidebar: SidebarData<'a>,
}

#[derive(Debug, Serialize)]
pub struct CategoryView<'a> {
    pub site: SiteData<'a>,
    pub category: &'a Category,
    pub pagination: PaginationData,
    pub posts: Vec<PostSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TagView<'a> {
    pub site: SiteData<'a>,
    pub tag: &'a Tag,
    pub pagination: PaginationData,
    pub posts: Vec<PostSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct PostView<'a> {
    pub site: SiteData<'a>,
    pub title: &'a str,
    pub slug: &'a str,
    pub permalink: &'a str,
    pub date: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub show_date: String,
    pub category: &'a str,
    pub category_link: Option<&'a str>,
    pub tags: Vec<TagLink<'a>>,
    pub cover: &'a str,
    pub comments: bool,
    pub content: &'a str,
    pub prev: Option<NavPost<'a>>,
    pub next: Option<NavPost<'a>>,
}

impl<'a> PostView<'a> {
    pub fn new(
        post: &'a Post,
        store: &'a ContentStore,
        config: &'a SiteConfig,
        now: &DateTime<Utc>,
    ) -> Self {
        let (prev, next) = store.adjacent(post);
        Self {
            site: SiteData::new(config),
            title: &post.title,
            slug: &post.slug,
            permalink: &post.permalink,
            date: post.date,
            updated: post.updated,
            show_date: format_show_date(&post.date, now, config),
            category: &post.category,
            category_link: category_link(post, store),
            tags: tag_links(post, store),
            cover: &post.cover,
            comments: post.comments,
            content: &post.content,
            prev: prev.map(NavPost::from),
            next: next.map(NavPost::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    pub site: SiteData<'a>,
    #[serde(flatten)]
    pub page: &'a Page,
}

#[derive(Debug, Serialize)]
pub struct SearchView<'a> {
    pub site: SiteData<'a>,
    pub query: &'a str,
    pub posts: Vec<PostSummary<'a>>,
}
