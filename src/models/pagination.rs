//! Cursor pagination for customer listing.

use crate::config::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListCustomersParams {
    pub limit: Option<u32>,
    pub starting_after: Option<String>,
}

impl Default for ListCustomersParams {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_PAGE_LIMIT),
            starting_after: None,
        }
    }
}

impl ListCustomersParams {
    pub fn new(limit: Option<u32>, starting_after: Option<String>) -> Self {
        Self {
            limit,
            starting_after: starting_after.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn get_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    /// Query pairs for the list request.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.get_limit().to_string())];
        if let Some(cursor) = &self.starting_after {
            query.push(("starting_after", cursor.clone()));
        }
        query
    }
}
