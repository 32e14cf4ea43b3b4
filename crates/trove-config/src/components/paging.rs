//! Paging limits
//!
//! Global `(default_limit, max_limit)` pair. Resolvers and endpoints may
//! declare their own pair, which takes precedence.

use serde::{Deserialize, Serialize};

/// Paging component configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Page size used when a request gives no limit
    pub default_limit: usize,
    /// Largest limit a request may ask for
    pub max_limit: usize,
}

impl PagingConfig {
    /// Create a paging pair
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}
