//! Logging configuration

use serde::{Deserialize, Serialize};

/// Logging component configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `trove_query=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// One JSON object per line
    #[serde(rename = "json")]
    Json,
    /// Compact single-line text
    #[serde(rename = "text")]
    Text,
    /// Multi-line human readable output
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
