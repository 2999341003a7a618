//! Search, filter and pagination state owned by one list controller.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::types::{FilterName, FilterValue, PageSize};

/// Committed query state of a list.
///
/// Fields are only writable from inside the crate; the controller is the
/// single writer. Every mutation that changes the shape of the result set
/// (search, filters, size) moves back to the first page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ListQueryState {
    page: usize,
    size: PageSize,
    search: String,
    filters: BTreeMap<FilterName, FilterValue>,
}

impl ListQueryState {
    pub fn new(page: usize, size: PageSize) -> Self {
        Self {
            page,
            size,
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Effective (debounced, trimmed) search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &BTreeMap<FilterName, FilterValue> {
        &self.filters
    }

    pub fn filter(&self, name: &FilterName) -> Option<&FilterValue> {
        self.filters.get(name)
    }

    /// Filters that currently narrow the result set.
    pub fn active_filters(&self) -> impl Iterator<Item = (&FilterName, &FilterValue)> {
        self.filters.iter().filter(|(_, value)| !value.is_empty())
    }

    /// Returns `true` when the page actually moved.
    pub(crate) fn set_page(&mut self, page: usize) -> bool {
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    pub(crate) fn set_size(&mut self, size: PageSize) -> bool {
        let changed = self.size != size || self.page != 0;
        self.size = size;
        self.page = 0;
        changed
    }

    pub(crate) fn set_search(&mut self, search: &str) -> bool {
        let search = search.trim();
        if self.search == search {
            return false;
        }
        self.search = search.to_string();
        self.page = 0;
        true
    }

    /// Stores a normalized filter value; a cleared value removes the entry so
    /// that "never touched" and "cleared" look the same downstream.
    pub(crate) fn set_filter(&mut self, name: FilterName, value: FilterValue) -> bool {
        let before = self.filters.get(&name).cloned();
        if value.is_empty() {
            self.filters.remove(&name);
        } else {
            self.filters.insert(name.clone(), value);
        }
        let changed = before.as_ref() != self.filters.get(&name) || self.page != 0;
        self.page = 0;
        changed
    }

    pub(crate) fn clear_filters(&mut self) -> bool {
        let changed = !self.filters.is_empty() || self.page != 0;
        self.filters.clear();
        self.page = 0;
        changed
    }
}
