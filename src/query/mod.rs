//! Pure queries over a content snapshot: lookup, pagination and search

mod lookup;
mod pagination;
mod search;

pub use lookup::find_by_name_or_slug;
pub use pagination::{page_numbers, page_url, paginate, total_pages, PageLink, Paginated};
pub use search::search;
