// ── Pagination ──
//
// 1-based paging over in-memory lists, plus the compact page-button
// window rendered under the key and apartment tables.

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_BUTTONS: usize = 3;

/// Number of pages needed for `len` items; zero for an empty list.
pub fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    len.div_ceil(per_page)
}

/// Items on 1-based `page`. Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    items.get(start..end).unwrap_or(&[])
}

/// Visible page buttons around the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<usize>,
    pub leading_ellipsis: bool,
    pub trailing_ellipsis: bool,
}

pub fn page_window(current: usize, total: usize, max_shown: usize) -> PageWindow {
    if total == 0 || max_shown == 0 {
        return PageWindow {
            pages: Vec::new(),
            leading_ellipsis: false,
            trailing_ellipsis: false,
        };
    }
    let shown = max_shown.min(total);
    let current = current.clamp(1, total);
    let half = shown / 2;
    let start = current.saturating_sub(half).max(1).min(total - shown + 1);
    let end = start + shown - 1;
    PageWindow {
        pages: (start..=end).collect(),
        leading_ellipsis: start > 1,
        trailing_ellipsis: end < total,
    }
}

/// Cursor over a paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    per_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        page_count(len, self.per_page)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page_slice(items, self.page, self.per_page)
    }

    pub fn window(&self, len: usize) -> PageWindow {
        page_window(self.page, self.total_pages(len), MAX_PAGE_BUTTONS)
    }

    pub fn next(&mut self, len: usize) {
        if self.page < self.total_pages(len) {
            self.page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn go_to(&mut self, page: usize, len: usize) {
        self.page = page.clamp(1, self.total_pages(len).max(1));
    }

    /// Pull the cursor back after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, self.total_pages(len).max(1));
    }

    /// Back to the first page, e.g. when the search query changes.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Offset of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}
