pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 25];
pub const DEFAULT_ROWS_PER_PAGE: usize = 5;

/// Page position of a client-side paginated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: usize,
    pub rows_per_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl Pager {
    pub fn new(page: usize, rows_per_page: usize) -> Self {
        Self {
            page,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let start = self.page.saturating_mul(self.rows_per_page).min(total);
        let end = start.saturating_add(self.rows_per_page).min(total);
        start..end
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < page_count(total, self.rows_per_page) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Moves to the next size option and back to the first page.
    pub fn cycle_rows_per_page(&mut self) {
        let idx = ROWS_PER_PAGE_OPTIONS
            .iter()
            .position(|opt| *opt == self.rows_per_page)
            .map(|idx| (idx + 1) % ROWS_PER_PAGE_OPTIONS.len())
            .unwrap_or(0);
        self.set_rows_per_page(ROWS_PER_PAGE_OPTIONS[idx]);
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.page = 0;
    }

    /// Pulls the page back inside the collection after it shrank.
    pub fn clamp(&mut self, total: usize) {
        let pages = page_count(total, self.rows_per_page);
        if pages == 0 {
            self.page = 0;
        } else if self.page >= pages {
            self.page = pages - 1;
        }
    }

    /// "6-10 of 23" style label.
    pub fn label(&self, total: usize) -> String {
        let range = self.range(total);
        if range.is_empty() {
            return format!("0 of {total}");
        }
        format!("{}-{} of {total}", range.start + 1, range.end)
    }
}

pub fn page_slice<T>(rows: &[T], pager: Pager) -> &[T] {
    &rows[pager.range(rows.len())]
}

pub fn page_count(total: usize, rows_per_page: usize) -> usize {
    let size = rows_per_page.max(1);
    total.div_ceil(size)
}
