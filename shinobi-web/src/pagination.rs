//! Pagination utilities for shinobi-web
//!
//! Query parameter sanitizing, local slicing of full collections, and the
//! page-number strip shown under the character grid.

/// Characters per page when the client does not ask for a size
pub const DEFAULT_PER_PAGE: usize = 50;

/// Largest page size a client may request
pub const MAX_PER_PAGE: usize = 500;

/// Number of page buttons shown before ellipsis compression kicks in
pub const MAX_PAGE_BUTTONS: usize = 7;

/// Sanitized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: usize,
    /// Items per page, within `1..=MAX_PER_PAGE`
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build from raw query-string values
    ///
    /// Missing or non-numeric values use the defaults; out-of-range values
    /// are clamped.
    ///
    /// # Examples
    /// ```
    /// use shinobi_web::pagination::PageRequest;
    ///
    /// let p = PageRequest::from_query(Some("3"), Some("20"));
    /// assert_eq!((p.page, p.per_page), (3, 20));
    ///
    /// let p = PageRequest::from_query(Some("-4"), Some("abc"));
    /// assert_eq!((p.page, p.per_page), (1, 50));
    /// ```
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<i64>().ok());

        let page = parse(page).unwrap_or(1).max(1) as usize;
        let per_page = parse(per_page)
            .unwrap_or(DEFAULT_PER_PAGE as i64)
            .clamp(1, MAX_PER_PAGE as i64) as usize;

        Self { page, per_page }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Keep only the items in `[offset, offset + per_page)`
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.per_page)
            .collect()
    }
}

/// Number of pages needed for `total` items (0 for an empty collection)
pub fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// One entry of the page-number strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Gap,
}

/// Page numbers to render, with first/last pages and `…` gaps
///
/// Shows every page when there are at most `max_buttons`; otherwise a
/// window of `current ± max_buttons / 2`, shifted to stay inside
/// `1..=total_pages`.
pub fn page_range(current: usize, total_pages: usize, max_buttons: usize) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    if total_pages <= max_buttons {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let delta = max_buttons / 2;
    let mut start = current.saturating_sub(delta).max(1);
    let mut end = (current + delta).min(total_pages);
    if start == 1 {
        end = total_pages.min(max_buttons);
    }
    if end == total_pages {
        start = (total_pages + 1).saturating_sub(max_buttons).max(1);
    }

    let mut range = Vec::with_capacity(max_buttons + 4);
    if start > 1 {
        range.push(PageItem::Page(1));
        if start > 2 {
            range.push(PageItem::Gap);
        }
    }
    range.extend((start..=end).map(PageItem::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            range.push(PageItem::Gap);
        }
        range.push(PageItem::Page(total_pages));
    }
    range
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Gap, Page};

    #[test]
    fn test_from_query_defaults() {
        let p = PageRequest::from_query(None, None);
        assert_eq!(p, PageRequest::default());
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_from_query_clamps() {
        let p = PageRequest::from_query(Some("0"), Some("0"));
        assert_eq!((p.page, p.per_page), (1, 1));

        let p = PageRequest::from_query(Some("2"), Some("100000"));
        assert_eq!((p.page, p.per_page), (2, MAX_PER_PAGE));
    }

    #[test]
    fn test_slice_middle_and_past_end() {
        let items: Vec<u32> = (1..=120).collect();
        let p = PageRequest { page: 2, per_page: 50 };
        let page = p.slice(items.clone());
        assert_eq!(page.len(), 50);
        assert_eq!(page[0], 51);

        let p = PageRequest { page: 3, per_page: 50 };
        assert_eq!(p.slice(items.clone()).len(), 20);

        let p = PageRequest { page: 9, per_page: 50 };
        assert!(p.slice(items).is_empty());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(1431, 50), 29);
    }

    #[test]
    fn test_page_range_small_total_shows_all() {
        assert_eq!(page_range(2, 3, 7), vec![Page(1), Page(2), Page(3)]);
        assert!(page_range(1, 0, 7).is_empty());
    }

    #[test]
    fn test_page_range_near_start() {
        assert_eq!(
            page_range(1, 20, 7),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7), Gap, Page(20)]
        );
        assert_eq!(
            page_range(5, 20, 7),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7), Page(8), Gap, Page(20)]
        );
    }

    #[test]
    fn test_page_range_middle() {
        assert_eq!(
            page_range(10, 20, 7),
            vec![
                Page(1),
                Gap,
                Page(7),
                Page(8),
                Page(9),
                Page(10),
                Page(11),
                Page(12),
                Page(13),
                Gap,
                Page(20)
            ]
        );
    }

    #[test]
    fn test_page_range_near_end() {
        assert_eq!(
            page_range(20, 20, 7),
            vec![Page(1), Gap, Page(14), Page(15), Page(16), Page(17), Page(18), Page(19), Page(20)]
        );
    }

    #[test]
    fn test_page_range_out_of_bounds_current_is_clamped() {
        assert_eq!(page_range(99, 20, 7), page_range(20, 20, 7));
    }
}
