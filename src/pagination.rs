//! This module defines the common functionality for paging data.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of rows per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
        }
    }
}

/// The number of pages needed to display `total` rows at `page_size` rows per
/// page.
///
/// A zero `page_size` is treated as one row per page to avoid division by
/// zero.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    let page_size = page_size.max(1);

    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::page_count;

    #[test]
    fn exact_multiple() {
        assert_eq!(page_count(40, 20), 2);
    }

    #[test]
    fn partial_last_page() {
        assert_eq!(page_count(41, 20), 3);
    }

    #[test]
    fn empty_result_set_has_zero_pages() {
        assert_eq!(page_count(0, 20), 0);
    }

    #[test]
    fn zero_page_size_does_not_panic() {
        assert_eq!(page_count(5, 0), 5);
    }
}
