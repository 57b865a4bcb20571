//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A page request.
///
/// [Page::from_raw] always produces fields of at least 1. A page number of 0
/// is treated as the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The 1-indexed page number.
    pub number: u64,
    /// The maximum number of items on the page.
    pub size: u64,
}

impl Page {
    /// Build a page from raw query string values.
    ///
    /// Missing, non-integer or non-positive values fall back to the defaults in
    /// `config`, and sizes larger than [PaginationConfig::max_page_size] are
    /// clamped to it.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, config: &PaginationConfig) -> Self {
        let number = parse_positive(page).unwrap_or(config.default_page).max(1);
        let size = parse_positive(limit)
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size.max(1));

        Self { number, size }
    }

    /// The number of items to skip to get to the start of this page.
    pub fn offset(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|value| *value >= 1)
}
