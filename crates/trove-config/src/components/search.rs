//! Search collaborator configuration
//!
//! The search API base URL is resolved once at startup and injected; nothing
//! downstream reads it from the process environment.

use serde::{Deserialize, Serialize};

/// Downstream search service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether search-backed fields are available
    pub enabled: bool,
    /// Base URL of the search API, e.g. `https://search.internal`
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout_secs: u64,
    /// Header that carries the caller's credential token
    pub credential_header: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            timeout_secs: 10,
            credential_header: "Authorization".to_string(),
        }
    }
}
