//! Page slicing for listing views.
//!
//! Out-of-range page numbers clamp to the nearest valid page instead of failing.

use serde::Serialize;

/// One page of an ordered collection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// The page actually served, after clamping.
    pub page: usize,
    /// Every valid page number, starting at 1.
    pub page_range: Vec<usize>,
}

/// Parse a raw `page` parameter. Missing, zero, negative or garbage values mean page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&page| page > 0)
        .unwrap_or(1)
}

/// Number of pages needed for `total` items. An empty collection still has one page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// Slice `items` into the requested page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let pages = page_count(items.len(), page_size);
    let page = page.clamp(1, pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items,
        page,
        page_range: (1..=pages).collect(),
    }
}
