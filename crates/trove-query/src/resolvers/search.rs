//! Text search over the external search collaborator.
//!
//! Not a pipeline resolver: the candidates come from the search service,
//! not from a graph pattern. Hits are summarised inside the request's
//! read transaction like every other node.

use super::NodeSummary;
use crate::context::ExecutionContext;
use crate::error::{QueryError, QueryResult};
use crate::paging::{Limits, PageRequest, PagingPolicy};
use crate::schema::{FieldRequest, FieldResolver};
use crate::search::SearchError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use trove_core::Term;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultNode {
    pub node: NodeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// `search(query, limit)` root field
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchNodes {
    limits: Limits,
}

impl SearchNodes {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }
}

#[async_trait]
impl FieldResolver for SearchNodes {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn resolve(&self, ctx: &ExecutionContext, request: &FieldRequest) -> QueryResult<Value> {
        let args = &request.arguments;
        let query = args.required_str("query")?;
        let policy = PagingPolicy::resolve(
            PageRequest::new(args.optional_int("limit")?, None),
            self.limits,
        )?;
        let limit = policy.take().unwrap_or(self.limits.default_limit);

        let client = ctx.search().ok_or(SearchError::NotConfigured)?;
        let hits = client.search(query, limit, ctx.credential()).await?;
        debug!(hits = hits.len(), "search answered");

        let results = ctx
            .with_read_transaction(|txn| async move {
                hits.into_iter()
                    .map(|hit| {
                        Ok(SearchResultNode {
                            node: NodeSummary::load(&Term::from_reference(&hit.uri), &txn)?,
                            score: hit.score,
                            snippet: hit.snippet,
                        })
                    })
                    .collect::<QueryResult<Vec<_>>>()
            })
            .await?;

        serde_json::to_value(results).map_err(|e| QueryError::Serialization(e.to_string()))
    }
}
