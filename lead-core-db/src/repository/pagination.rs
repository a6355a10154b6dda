/// Page size of the lead list
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Offset-based pagination parameters
///
/// # Example
/// ```
/// use lead_core_db::repository::pagination::PageRequest;
///
/// let first = PageRequest::for_page(10, 1);
/// let third = PageRequest::for_page(10, 3);
/// assert_eq!((first.offset, third.offset), (0, 20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of items to return
    pub limit: usize,
    /// Number of items to skip
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Request for a 1-based page number; page 0 is treated as page 1.
    pub fn for_page(page_size: usize, page_number: usize) -> Self {
        let page_number = page_number.max(1);
        Self {
            limit: page_size,
            offset: (page_number - 1) * page_size,
        }
    }

    /// The request for the page after this one
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }

    pub fn page_number(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            (self.offset / self.limit) + 1
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::for_page(DEFAULT_PAGE_SIZE, 1)
    }
}

/// One page of results with the size of the whole result set
///
/// # Example
/// ```
/// use lead_core_db::repository::pagination::Page;
///
/// let page = Page::new(vec!["a", "b"], 12, 10, 10);
/// assert_eq!(page.page_number(), 2);
/// assert_eq!(page.total_pages(), 2);
/// assert!(!page.has_more());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn page_number(&self) -> usize {
        PageRequest::new(self.limit, self.offset).page_number()
    }

    /// Total pages; an empty result still has one (empty) page
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            self.total.div_ceil(self.limit).max(1)
        }
    }

    /// Converts the items, keeping the paging metadata
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, self.total, self.limit, self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_first_lead_page() {
        let request = PageRequest::default();

        assert_eq!(request, PageRequest::new(10, 0));
        assert_eq!(request.next(), PageRequest::new(10, 10));
        assert_eq!(PageRequest::for_page(10, 0), request);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page: Page<u8> = Page::new(Vec::new(), 0, 10, 0);

        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_more());
    }

    #[test]
    fn test_try_map_keeps_metadata() {
        let page = Page::new(vec!["1", "2"], 5, 2, 2);

        let parsed: Page<u32> = page.try_map(|s| s.parse::<u32>()).unwrap();

        assert_eq!(parsed.items, vec![1, 2]);
        assert_eq!((parsed.total, parsed.limit, parsed.offset), (5, 2, 2));
        assert!(parsed.has_more());
    }
}
