//! Tag and category resolution by name or slug

use crate::content::Taxonomy;
use crate::error::QueryError;

/// Find the first entity whose name equals `name` or whose slug equals `slug`.
///
/// The two fields are matched independently: an entity qualifies when
/// either one matches. A missing or empty argument never matches, so
/// calling with neither yields [`QueryError::NotFound`].
pub fn find_by_name_or_slug<'a, T: Taxonomy>(
    items: &'a [T],
    name: Option<&str>,
    slug: Option<&str>,
) -> Result<&'a T, QueryError> {
    let name = name.filter(|n| !n.is_empty());
    let slug = slug.filter(|s| !s.is_empty());

    if name.is_none() && slug.is_none() {
        return Err(QueryError::NotFound);
    }

    items
        .iter()
        .find(|item| name == Some(item.name()) || slug == Some(item.slug()))
        .ok_or(QueryError::NotFound)
}
