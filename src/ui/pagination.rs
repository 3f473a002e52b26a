use std::ops::Range;

pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 25];

/// Client-side paging over an in-memory list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    rows_per_page: usize,
}

impl Paginator {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            page: 0,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.rows_per_page).max(1)
    }

    pub fn range(&self, len: usize) -> Range<usize> {
        let start = (self.page * self.rows_per_page).min(len);
        let end = (start + self.rows_per_page).min(len);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn next_page(&mut self, len: usize) {
        if self.page + 1 < self.page_count(len) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Changing the page size always returns to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.page = 0;
    }

    pub fn cycle_rows_per_page(&mut self) {
        let next = ROWS_PER_PAGE_OPTIONS
            .iter()
            .copied()
            .find(|&n| n > self.rows_per_page)
            .unwrap_or(ROWS_PER_PAGE_OPTIONS[0]);
        self.set_rows_per_page(next);
    }

    /// Pull the page back in range after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        let last = self.page_count(len) - 1;
        if self.page > last {
            self.page = last;
        }
    }

    /// e.g. `21–23 of 23`.
    pub fn label(&self, len: usize) -> String {
        let range = self.range(len);
        if range.is_empty() {
            format!("0–0 of {}", len)
        } else {
            format!("{}–{} of {}", range.start + 1, range.end, len)
        }
    }
}
