//! Page arithmetic for catalog listings.

/// A page within a listing of `total_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
}

impl Pagination {
    /// Products per home page.
    pub const CATALOG_PAGE_SIZE: u32 = 12;

    /// Build a pagination, treating page 0 as page 1.
    #[must_use]
    pub fn new(page: u32, page_size: u32, total_items: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            total_items,
        }
    }

    /// Number of pages, never less than one.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Rows to skip for the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Rows to fetch for the current page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    #[must_use]
    pub fn prev_page(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        (self.page < self.total_pages()).then(|| self.page + 1)
    }
}
