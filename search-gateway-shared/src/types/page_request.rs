//! Pagination parameters for document listings.

use serde::{Deserialize, Serialize};

/// Page-based pagination request.
///
/// Pages are 1-based. The offset sent to the cluster is
/// `(page - 1) * page_size`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Number of documents per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageRequest {
    /// Create a request for the given page and page size.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Number of documents to skip.
    ///
    /// Computed in `u64` so it cannot overflow. Page 0 yields 0.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Number of documents to return.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Validate the request.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.page == 0 {
            return Err("page must be at least 1".to_string());
        }
        if self.page_size == 0 {
            return Err("page_size must be at least 1".to_string());
        }
        Ok(())
    }
}
