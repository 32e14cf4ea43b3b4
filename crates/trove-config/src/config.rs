//! Top-level configuration

use crate::components::{EndpointConfig, LoggingConfig, PagingConfig, SearchConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete trove configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TroveConfig {
    /// Global paging limits
    pub paging: PagingConfig,
    /// GraphQL endpoints registered over the dataset
    pub endpoints: Vec<EndpointConfig>,
    /// Downstream search collaborator
    pub search: SearchConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl TroveConfig {
    /// Configuration with defaults everywhere
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an endpoint by name
    pub fn endpoint(&self, name: &str) -> Option<&EndpointConfig> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    /// Paging limits that apply on `endpoint`
    pub fn paging_for(&self, endpoint: &str) -> PagingConfig {
        self.endpoint(endpoint)
            .and_then(|e| e.paging)
            .unwrap_or(self.paging)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_paging("paging", &self.paging)?;

        let mut seen = HashSet::new();
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("endpoints[{}].name", i),
                    "endpoint name must not be empty",
                ));
            }
            if !seen.insert(endpoint.name.as_str()) {
                return Err(ConfigError::invalid(
                    format!("endpoints[{}].name", i),
                    format!("duplicate endpoint '{}'", endpoint.name),
                ));
            }
            if let Some(paging) = &endpoint.paging {
                validate_paging(&format!("endpoints[{}].paging", i), paging)?;
            }
        }

        if self.search.enabled && self.search.base_url.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::invalid(
                "search.base_url",
                "required when search is enabled",
            ));
        }

        Ok(())
    }
}

fn validate_paging(field: &str, paging: &PagingConfig) -> Result<(), ConfigError> {
    if paging.default_limit == 0 {
        return Err(ConfigError::invalid(
            format!("{}.default_limit", field),
            "must be at least 1",
        ));
    }
    if paging.max_limit < paging.default_limit {
        return Err(ConfigError::invalid(
            format!("{}.max_limit", field),
            format!(
                "{} is smaller than default_limit {}",
                paging.max_limit, paging.default_limit
            ),
        ));
    }
    Ok(())
}
