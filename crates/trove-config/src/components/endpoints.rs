//! Endpoint declarations
//!
//! One dataset may be exposed through several independently-schemed GraphQL
//! endpoints. Each entry names the endpoint and lists the root fields bound
//! on it.

use super::paging::PagingConfig;
use serde::{Deserialize, Serialize};

/// A named GraphQL endpoint over the shared dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint name, used as the routing key
    pub name: String,
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Root field names exposed on this endpoint
    #[serde(default)]
    pub fields: Vec<String>,
    /// Endpoint-wide paging override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingConfig>,
}

impl EndpointConfig {
    /// Endpoint exposing the given fields with global paging
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: fields.into_iter().map(Into::into).collect(),
            paging: None,
        }
    }

    /// Set an endpoint-wide paging override
    pub fn with_paging(mut self, paging: PagingConfig) -> Self {
        self.paging = Some(paging);
        self
    }
}
