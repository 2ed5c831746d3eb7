use std::ops::Range;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Paging for one panel. Pages are 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_size: usize,
    pub current_page: usize,
    pub view_all: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub view_all: bool,
    pub total_rows: usize,
}

impl PaginationState {
    pub fn with_page_size(page_size: usize) -> Self {
        PaginationState { page_size: page_size.max(1), current_page: 1, view_all: false }
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Changing the page size always returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    pub fn set_page(&mut self, page: usize, total_rows: usize) {
        self.current_page = page.clamp(1, self.total_pages(total_rows));
    }

    /// Pull `current_page` back into range after the row count shrank. Returns whether it moved.
    pub fn clamp(&mut self, total_rows: usize) -> bool {
        let clamped = self.current_page.clamp(1, self.total_pages(total_rows));
        let moved = clamped != self.current_page;
        self.current_page = clamped;
        moved
    }

    /// Row range of the current page; the whole set when `view_all` is on.
    pub fn page_range(&self, total_rows: usize) -> Range<usize> {
        if self.view_all {
            return 0..total_rows;
        }
        let size = self.page_size.max(1);
        let start = (self.current_page.saturating_sub(1) * size).min(total_rows);
        let end = (start + size).min(total_rows);
        start..end
    }

    pub fn info(&self, total_rows: usize) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            total_pages: if self.view_all { 1 } else { self.total_pages(total_rows) },
            page_size: self.page_size,
            view_all: self.view_all,
            total_rows,
        }
    }
}
