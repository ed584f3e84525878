/// One page of a list ordered elsewhere. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
    pub total: u64,
}

impl Page {
    /// Parse a `?page=` value; anything missing, non-numeric or zero is page 1.
    pub fn parse_number(raw: Option<&str>) -> u32 {
        raw.and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }

    pub fn new(number: u32, per_page: u32, total: u64) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
            total,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number as u64 - 1) * self.per_page as u64
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(self.per_page as u64);
        pages.max(1) as u32
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages()
    }

    /// Pagination links are only worth rendering when there is more than one page.
    pub fn is_paginated(&self) -> bool {
        self.total_pages() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_defaults_to_first_page() {
        assert_eq!(Page::parse_number(None), 1);
        assert_eq!(Page::parse_number(Some("")), 1);
        assert_eq!(Page::parse_number(Some("0")), 1);
        assert_eq!(Page::parse_number(Some("-3")), 1);
        assert_eq!(Page::parse_number(Some("abc")), 1);
        assert_eq!(Page::parse_number(Some("4")), 4);
    }

    #[test]
    fn offsets_and_page_counts() {
        let page = Page::new(3, 30, 61);
        assert_eq!(page.offset(), 60);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert!(page.is_paginated());
    }

    #[test]
    fn empty_list_is_one_page() {
        let page = Page::new(1, 30, 0);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.is_paginated());
        assert!(!page.has_next());
    }
}
