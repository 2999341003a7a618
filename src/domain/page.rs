use serde::{Deserialize, Serialize};

/// Page envelope returned by a paged query.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> PageResult<T> {
    #[must_use]
    pub fn new(content: Vec<T>, total_elements: usize, total_pages: usize) -> Self {
        Self {
            content,
            total_elements,
            total_pages,
        }
    }

    /// Builds the envelope for one slice of a larger result set.
    #[must_use]
    pub fn from_slice(content: Vec<T>, total_elements: usize, page_size: usize) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_elements.div_ceil(page_size)
        };
        Self::new(content, total_elements, total_pages)
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }

    /// Highest valid zero-based page index, if any page exists.
    pub fn last_page(&self) -> Option<usize> {
        self.total_pages.checked_sub(1)
    }
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_page_envelope() {
        let page: PageResult<u32> =
            serde_json::from_str(r#"{"content":[1,2],"totalElements":47,"totalPages":5}"#)
                .unwrap();
        assert_eq!(page.content, vec![1, 2]);
        assert_eq!(page.total_elements, 47);
        assert_eq!(page.last_page(), Some(4));
    }

    #[test]
    fn from_slice_rounds_pages_up() {
        let page = PageResult::from_slice(vec!['a'; 10], 47, 10);
        assert_eq!(page.total_pages, 5);
        assert_eq!(PageResult::<u8>::empty().last_page(), None);
    }
}
