//! Slug validation

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::StoreError;

lazy_static! {
    static ref SLUG_PATTERN: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

const MAX_SLUG_LEN: usize = 200;

/// Slugs posts may not use
pub const RESERVED_POST_SLUGS: &[&str] = &["admin", "login"];

/// Slugs pages may not use, they would shadow top-level routes
pub const RESERVED_PAGE_SLUGS: &[&str] = &["admin", "login", "cats", "page", "tags"];

/// Check a slug is lowercase kebab-case and not reserved for `collection`
pub fn validate_slug(
    collection: &'static str,
    slug: &str,
    reserved: &[&str],
) -> Result<(), StoreError> {
    if slug.len() > MAX_SLUG_LEN || !SLUG_PATTERN.is_match(slug) {
        return Err(StoreError::InvalidSlug {
            collection,
            slug: slug.to_string(),
        });
    }

    if reserved.contains(&slug) {
        return Err(StoreError::ReservedSlug {
            collection,
            slug: slug.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_kebab_case() {
        assert!(validate_slug("posts", "hello-world-2024", RESERVED_POST_SLUGS).is_ok());
        assert!(validate_slug("posts", "a", RESERVED_POST_SLUGS).is_ok());
    }

    #[test]
    fn test_rejects_malformed() {
        for slug in ["", "Hello", "a--b", "-a", "a-", "a b", "中文"] {
            assert!(
                matches!(
                    validate_slug("posts", slug, &[]),
                    Err(StoreError::InvalidSlug { .. })
                ),
                "{:?} should be rejected",
                slug
            );
        }
        let long = "a".repeat(201);
        assert!(validate_slug("posts", &long, &[]).is_err());
    }

    #[test]
    fn test_rejects_reserved() {
        assert_eq!(
            validate_slug("pages", "tags", RESERVED_PAGE_SLUGS),
            Err(StoreError::ReservedSlug {
                collection: "pages",
                slug: "tags".to_string()
            })
        );
        // Only pages reserve route prefixes
        assert!(validate_slug("posts", "tags", RESERVED_POST_SLUGS).is_ok());
    }
}
