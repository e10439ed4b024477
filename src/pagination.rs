//! Page links for server-rendered tables.

use serde::Serialize;

/// How many page links surround the first, last and current page.
#[derive(Clone, Copy, Debug)]
struct PageWindow {
    edge: usize,
    before_current: usize,
    after_current: usize,
}

const CLIENT_TABLE_WINDOW: PageWindow = PageWindow {
    edge: 2,
    before_current: 2,
    after_current: 4,
};

impl PageWindow {
    /// Page numbers to render; `None` is an ellipsis between two runs.
    fn links(self, total_pages: usize, current: usize) -> Vec<Option<usize>> {
        if total_pages == 0 {
            return Vec::new();
        }

        let mut links = Vec::new();
        let head_end = (1 + self.edge).min(total_pages + 1);
        links.extend((1..head_end).map(Some));

        let mid_start = head_end.max(current.saturating_sub(self.before_current));
        let mid_end = (current + self.after_current + 1).min(total_pages + 1);
        if mid_start > head_end {
            links.push(None);
        }
        links.extend((mid_start..mid_end).map(Some));

        let tail_start = mid_end.max(total_pages.saturating_sub(self.edge) + 1);
        if tail_start > mid_end {
            links.push(None);
        }
        links.extend((tail_start..=total_pages).map(Some));

        links
    }
}

/// One page of `items` plus the links of the pager under the table.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    /// Number of matching rows across every page.
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Builds the page from a row count as returned by the repository.
    pub fn from_total(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        let page = current_page.max(1);
        let total_pages = total.div_ceil(per_page.max(1));
        Self {
            items,
            pages: CLIENT_TABLE_WINDOW.links(total_pages, page),
            page,
            total,
        }
    }
}
