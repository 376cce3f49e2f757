//! Validate site content

use anyhow::Result;

use crate::store::Diagnostics;
use crate::Site;

/// Build the store and report content problems.
///
/// Hard errors (duplicate or invalid slugs, unreadable taxonomies) fail the
/// command; soft problems are printed and returned.
pub fn run(site: &Site) -> Result<Diagnostics> {
    let store = site.load_store()?;
    let diagnostics = store.diagnostics().clone();

    println!(
        "Checked {} posts, {} pages, {} tags, {} categories",
        store.posts().len(),
        store.pages().len(),
        store.tags().len(),
        store.categories().len()
    );

    if diagnostics.is_empty() {
        println!("No problems found.");
        return Ok(diagnostics);
    }

    let sections = [
        ("Categories not configured", &diagnostics.missing_categories),
        ("Tags not configured", &diagnostics.missing_tags),
        ("Posts without a cover", &diagnostics.missing_covers),
        ("Featured posts not found", &diagnostics.invalid_features),
        ("Pinned categories not found", &diagnostics.invalid_pinned),
    ];
    for (label, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("{} ({}):", label, items.len());
        for item in items {
            println!("  {}", item);
        }
    }

    Ok(diagnostics)
}
