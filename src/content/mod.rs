//! Content module - posts, pages, taxonomies and how they are read from disk

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod slug;

pub use frontmatter::FrontMatter;
pub use loader::{ContentLoader, LoadedContent};
pub use markdown::MarkdownRenderer;
pub use post::{Category, ContentRecord, Page, Post, Tag, Taxonomy, DEFAULT_COVER};
