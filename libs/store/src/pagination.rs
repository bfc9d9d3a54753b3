//! Page request translation

use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 500;

/// Natural key a listing is sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Email,
    Name,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Email => "email",
            SortKey::Name => "name",
        }
    }
}

/// 1-based page request as received from a caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page_id: Option<u32>,
    pub page_size: Option<u32>,
}

impl Pagination {
    pub fn new(page_id: u32, page_size: u32) -> Self {
        Self {
            page_id: Some(page_id),
            page_size: Some(page_size),
        }
    }

    /// Validate the request and translate it into skip/limit
    pub fn find_options(&self, sort_key: SortKey) -> StoreResult<FindOptions> {
        let page_id = self
            .page_id
            .ok_or_else(|| StoreError::Validation("page_id is required".to_string()))?;
        let page_size = self
            .page_size
            .ok_or_else(|| StoreError::Validation("page_size is required".to_string()))?;

        if page_id < 1 {
            return Err(StoreError::Validation(
                "page_id must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(StoreError::Validation(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(FindOptions {
            skip: u64::from(page_id - 1) * u64::from(page_size),
            limit: u64::from(page_size),
            sort_key,
        })
    }
}

/// Skip/limit pair with the ascending sort applied by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: u64,
    pub sort_key: SortKey,
}
