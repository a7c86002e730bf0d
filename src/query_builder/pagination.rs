/// Page-based LIMIT/OFFSET window plus the arithmetic a result envelope needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Create pagination with a 1-indexed page number and per-page count.
    /// Page numbers below 1 are treated as the first page.
    pub fn new(page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        Self {
            limit: Some(per_page),
            offset: Some((page - 1).saturating_mul(per_page)),
        }
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    /// Number of pages needed for `total_count` rows; never less than one
    pub fn total_pages(&self, total_count: u64) -> u64 {
        match self.limit {
            Some(limit) if limit > 0 => total_count.div_ceil(limit).max(1),
            _ => 1,
        }
    }

    /// Get current page number (1-indexed)
    pub fn current_page(&self) -> u64 {
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) if limit > 0 => (offset / limit) + 1,
            _ => 1,
        }
    }

    /// Check if there's a next page
    pub fn has_next_page(&self, total_count: u64) -> bool {
        self.current_page() < self.total_pages(total_count)
    }

    /// Check if there's a previous page
    pub fn has_previous_page(&self) -> bool {
        self.offset.is_some_and(|offset| offset > 0)
    }

    /// 1-indexed position of the first row on this page, if it has rows
    pub fn first_item(&self, rows_on_page: u64) -> Option<u64> {
        (rows_on_page > 0).then(|| self.offset.unwrap_or(0) + 1)
    }

    /// 1-indexed position of the last row on this page, if it has rows
    pub fn last_item(&self, rows_on_page: u64) -> Option<u64> {
        self.first_item(rows_on_page)
            .map(|first| first + rows_on_page - 1)
    }
}
