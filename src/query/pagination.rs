//! 1-based pagination over ordered slices

use serde::Serialize;

use crate::error::QueryError;

/// Navigation with this many pages or fewer lists every page
const FOLD_THRESHOLD: usize = 6;

/// One page of a larger sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginated<'a, T> {
    /// Items on this page, in the original order
    pub items: &'a [T],
    /// 1-based page number
    pub current: usize,
    pub total_pages: usize,
    pub page_size: usize,
}

impl<T> Paginated<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }
}

/// Number of pages needed for `len` items
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

/// Slice out page `page_num` (1-based) of `items`.
///
/// Fails with [`QueryError::InvalidPage`] when the page does not exist:
/// `page_num` is 0, exceeds the page count, or the list is empty. A zero
/// `page_size` has no pages at all.
pub fn paginate<T>(
    items: &[T],
    page_num: usize,
    page_size: usize,
) -> Result<Paginated<'_, T>, QueryError> {
    let total = total_pages(items.len(), page_size);
    if page_num == 0 || page_num > total {
        return Err(QueryError::InvalidPage {
            page: page_num,
            total_pages: total,
        });
    }

    let start = (page_num - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Ok(Paginated {
        items: &items[start..end],
        current: page_num,
        total_pages: total,
        page_size,
    })
}

/// An entry in the page navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageLink {
    Number { num: usize, current: bool },
    Dots,
}

/// Page navigation entries for `current` out of `total` pages.
///
/// Short runs list every page; longer ones keep the first and last page,
/// a window around `current`, and fold the rest into dots.
pub fn page_numbers(current: usize, total: usize) -> Vec<PageLink> {
    let number = |num: usize| PageLink::Number {
        num,
        current: num == current,
    };

    if total <= 1 {
        return Vec::new();
    }

    if total <= FOLD_THRESHOLD {
        return (1..=total).map(number).collect();
    }

    let mut links = Vec::with_capacity(9);
    if current < 5 {
        links.extend((1..=5).map(number));
        links.push(PageLink::Dots);
        links.push(number(total));
    } else if current > total - 4 {
        links.push(number(1));
        links.push(PageLink::Dots);
        links.extend((total - 4..=total).map(number));
    } else {
        links.push(number(1));
        links.push(PageLink::Dots);
        links.extend((current - 1..=current + 1).map(number));
        links.push(PageLink::Dots);
        links.push(number(total));
    }
    links
}

/// URL of page `num` under `root`; page 1 is `root` itself
pub fn page_url(root: &str, num: usize) -> String {
    if num <= 1 {
        return root.to_string();
    }
    format!("{}/page/{}", root.trim_end_matches('/'), num)
}
