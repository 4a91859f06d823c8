use serde::Serialize;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching records across all pages.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    pub total_pages: usize,
}

/// Cuts an already filtered and sorted list into a page. `page` is 1-based; zero is
/// treated as the first page.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let limit = limit.max(1);
    let page = page.max(1);
    let total = items.len();
    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    Page {
        items,
        total,
        page,
        total_pages: total.div_ceil(limit),
    }
}
