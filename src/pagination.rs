use serde::Serialize;

use crate::models::config::PageStripSettings;

/// One-based page links with `None` standing for a gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    settings: &PageStripSettings,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + settings.left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(settings.left_current));
    let mid_end = current_page
        .saturating_add(settings.right_current)
        .saturating_add(1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(settings.right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Page-number strip of a table footer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageStrip {
    /// One-based labels; `None` marks elided pages.
    pub pages: Vec<Option<usize>>,
    /// One-based label of the current page.
    pub page: usize,
    pub total_pages: usize,
}

impl PageStrip {
    /// Builds the strip for a zero-based `current_page`.
    pub fn new(current_page: usize, total_pages: usize, settings: &PageStripSettings) -> Self {
        let page = current_page.saturating_add(1);
        Self {
            pages: get_pages(total_pages, page, settings),
            page,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
