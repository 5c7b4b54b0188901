//! Offset pagination for player search.

use thiserror::Error;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const MAX_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("limit must be between 1 and {MAX_PAGE_LIMIT}, got {0}")]
    LimitOutOfRange(u32),
}

/// Window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Result<Self, PaginationError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(PaginationError::LimitOutOfRange(limit));
        }
        Ok(Self {
            skip: skip.unwrap_or(0),
            limit,
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let page = PageRequest::new(None, None).expect("defaults are valid");
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn limit_is_bounded() {
        assert_eq!(
            PageRequest::new(Some(5), Some(0)),
            Err(PaginationError::LimitOutOfRange(0))
        );
        assert_eq!(
            PageRequest::new(None, Some(1001)),
            Err(PaginationError::LimitOutOfRange(1001))
        );
        let page = PageRequest::new(Some(20), Some(1000)).expect("upper bound is valid");
        assert_eq!((page.skip, page.limit), (20, 1000));
    }
}
