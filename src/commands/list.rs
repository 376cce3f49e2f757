//! List site content

use anyhow::Result;

use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let store = site.load_store()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", store.posts().len());
            for post in store.posts() {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source.display()
                );
            }
        }
        "page" | "pages" => {
            println!("Pages ({}):", store.pages().len());
            for page in store.pages() {
                println!("  {} - {} [{}]", page.permalink, page.title, page.source.display());
            }
        }
        "tag" | "tags" => {
            println!("Tags ({}):", store.tags().len());
            for tag in store.top_tags(usize::MAX) {
                println!("  {} ({}) {}", tag.name, tag.count, tag.permalink);
            }
        }
        "category" | "categories" => {
            println!("Categories ({}):", store.categories().len());
            for category in store.categories() {
                println!(
                    "  {} ({}) {}",
                    category.name, category.count, category.permalink
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, tag, category",
                content_type
            );
        }
    }

    Ok(())
}
