//! # trove-query
//!
//! Resolves GraphQL fields against a quad store. Every filterable, paged
//! field goes through one template, [`QueryPipeline`]:
//!
//! ```text
//! arguments ─► filters + paging ─► read transaction ─► select ─► filter ─► page ─► map
//! ```
//!
//! The request-scoped [`ExecutionContext`] owns the read transaction, so
//! all fields of one request observe the same snapshot.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trove_core::MemoryQuadStore;
//! use trove_query::{EndpointRegistry, FieldRequest, GraphRequest, Arguments};
//! use trove_config::{EndpointConfig, TroveConfig};
//!
//! # async fn example() -> Result<(), trove_query::QueryError> {
//! let mut config = TroveConfig::new();
//! config.endpoints.push(EndpointConfig::new("graph", ["outgoing", "outgoingCount"]));
//!
//! let registry = EndpointRegistry::from_config(Arc::new(MemoryQuadStore::new()), &config)?;
//! let response = registry
//!     .execute(
//!         "graph",
//!         GraphRequest::new(vec![FieldRequest::new("outgoing")
//!             .with_arguments(Arguments::new().with("uri", "http://ex.org/a"))]),
//!     )
//!     .await?;
//! assert!(!response.has_errors());
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod context;
pub mod error;
pub mod filter;
pub mod paging;
pub mod pipeline;
pub mod resolvers;
pub mod schema;
pub mod search;
pub mod telemetry;

pub use args::Arguments;
pub use context::{CredentialToken, ExecutionContext, ReadHandle, TransactionState};
pub use error::{ErrorKind, QueryError, QueryResult};
pub use filter::{
    parse_filter, Filter, FilterChain, FilterDimension, FilterMode, FilterSpec,
    FilterSyntaxError, ValueSet,
};
pub use paging::{apply_paging, Limits, PageRequest, PagingPolicy};
pub use pipeline::{build_filters, PagingMode, QuadStream, QueryPipeline, QueryResolver};
pub use schema::{
    Endpoint, EndpointRegistry, FieldError, FieldRequest, FieldResolver, GraphRequest,
    GraphResponse, RootField, SourceArgument,
};
pub use search::{HttpSearchClient, SearchClient, SearchError, SearchHit};
