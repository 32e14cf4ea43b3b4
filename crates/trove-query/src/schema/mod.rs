//! Field dispatch and endpoint composition.
//!
//! One dataset can be exposed through several named endpoints. Each
//! endpoint binds field names to [`FieldResolver`]s; all of them share the
//! dataset, the search collaborator and the pipeline template.
//!
//! Responses follow GraphQL's partial-success model: a failing field gets
//! `null` in `data` plus one entry in `errors`, and its siblings are
//! unaffected.

mod catalog;

pub use catalog::{builtin_field, BUILTIN_FIELDS};

use crate::args::Arguments;
use crate::context::{CredentialToken, ExecutionContext};
use crate::error::{QueryError, QueryResult};
use crate::pipeline::{QueryPipeline, QueryResolver};
use crate::resolvers::NodeQuery;
use crate::search::{HttpSearchClient, SearchClient};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};
use trove_config::TroveConfig;
use trove_core::{GraphStore, Term};

/// Object-safe resolver bound to a field name
#[async_trait]
pub trait FieldResolver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, ctx: &ExecutionContext, request: &FieldRequest) -> QueryResult<Value>;
}

/// Builds a resolver's source object from the field request.
///
/// Runs before any transaction opens, so a missing `uri` is reported
/// without touching the store.
pub trait SourceArgument: Sized + Send + Sync {
    fn from_request(request: &FieldRequest) -> QueryResult<Self>;
}

impl SourceArgument for Term {
    fn from_request(request: &FieldRequest) -> QueryResult<Self> {
        request.arguments.required_node("uri")
    }
}

impl SourceArgument for () {
    fn from_request(_request: &FieldRequest) -> QueryResult<Self> {
        Ok(())
    }
}

impl SourceArgument for NodeQuery {
    fn from_request(request: &FieldRequest) -> QueryResult<Self> {
        let node = request.arguments.required_node("uri")?;
        NodeQuery::parse(node, &request.selection)
    }
}

/// Adapts a pipeline resolver to a root field
pub struct RootField<R> {
    resolver: R,
    pipeline: QueryPipeline,
}

impl<R> RootField<R> {
    pub fn new(resolver: R, pipeline: QueryPipeline) -> Self {
        Self { resolver, pipeline }
    }
}

#[async_trait]
impl<R> FieldResolver for RootField<R>
where
    R: QueryResolver,
    R::Source: SourceArgument,
    R::Output: Serialize,
{
    fn name(&self) -> &'static str {
        self.resolver.name()
    }

    async fn resolve(&self, ctx: &ExecutionContext, request: &FieldRequest) -> QueryResult<Value> {
        let source = R::Source::from_request(request)?;
        let output = self
            .pipeline
            .execute(&self.resolver, ctx, &source, &request.arguments)
            .await?;
        serde_json::to_value(output).map_err(|e| QueryError::Serialization(e.to_string()))
    }
}

/// One requested root field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
    /// Requested sub-field names
    #[serde(default)]
    pub selection: Vec<String>,
}

impl FieldRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_selection<I, S>(mut self, selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = selection.into_iter().map(Into::into).collect();
        self
    }

    /// Key under which the result appears in `data`
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A request against one endpoint
#[derive(Debug, Clone, Default)]
pub struct GraphRequest {
    pub fields: Vec<FieldRequest>,
    pub credential: Option<CredentialToken>,
}

impl GraphRequest {
    pub fn new(fields: Vec<FieldRequest>) -> Self {
        Self {
            fields,
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: CredentialToken) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// Field-level error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: Map::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Error entry for `err` raised while resolving the field at `key`
    pub fn from_query_error(key: &str, err: &QueryError) -> Self {
        Self::new(err.to_string())
            .with_path(vec![key.to_string()])
            .with_extension("code", Value::String(err.code().to_string()))
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.get("code").and_then(Value::as_str)
    }
}

/// Response with GraphQL partial-success semantics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl GraphResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// A named endpoint and its bound fields
pub struct Endpoint {
    name: String,
    description: Option<String>,
    fields: HashMap<String, Arc<dyn FieldResolver>>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, resolver: Arc<dyn FieldResolver>) -> Self {
        self.fields.insert(name.into(), resolver);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&Arc<dyn FieldResolver>> {
        self.fields.get(name)
    }

    /// Bound field names, sorted
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .finish()
    }
}

/// Every endpoint served over one dataset
pub struct EndpointRegistry {
    dataset: Arc<dyn GraphStore>,
    endpoints: HashMap<String, Endpoint>,
    search: Option<Arc<dyn SearchClient>>,
}

impl std::fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("endpoints", &self.endpoints)
            .field("search", &self.search.is_some())
            .finish_non_exhaustive()
    }
}

impl EndpointRegistry {
    pub fn new(dataset: Arc<dyn GraphStore>) -> Self {
        Self {
            dataset,
            endpoints: HashMap::new(),
            search: None,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    /// Register an endpoint, replacing any with the same name
    pub fn register(&mut self, endpoint: Endpoint) {
        debug!(endpoint = endpoint.name(), fields = endpoint.fields.len(), "registered endpoint");
        self.endpoints.insert(endpoint.name.clone(), endpoint);
    }

    /// Bind the configured endpoints to built-in resolvers.
    ///
    /// An unknown field name is a configuration error. The HTTP search
    /// client is created when search is enabled.
    pub fn from_config(dataset: Arc<dyn GraphStore>, config: &TroveConfig) -> QueryResult<Self> {
        let mut registry = Self::new(dataset);

        for endpoint_config in &config.endpoints {
            let pipeline = QueryPipeline::from_config(&config.paging_for(&endpoint_config.name));
            let mut endpoint = Endpoint::new(endpoint_config.name.clone());
            if let Some(description) = &endpoint_config.description {
                endpoint = endpoint.with_description(description.clone());
            }
            for field in &endpoint_config.fields {
                let resolver =
                    builtin_field(field, pipeline).ok_or_else(|| QueryError::UnknownField {
                        endpoint: endpoint_config.name.clone(),
                        field: field.clone(),
                    })?;
                endpoint = endpoint.with_field(field.clone(), resolver);
            }
            registry.register(endpoint);
        }

        if config.search.enabled {
            let client = HttpSearchClient::from_config(&config.search)?;
            registry.search = Some(Arc::new(client));
        }
        Ok(registry)
    }

    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.get(name)
    }

    /// Registered endpoint names, sorted
    pub fn endpoint_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.endpoints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve every root field of `request` against `endpoint`.
    ///
    /// All fields share one Execution Context and one read transaction and
    /// are resolved concurrently. Only an unknown endpoint fails the whole
    /// call; field failures become entries in `errors`.
    pub async fn execute(&self, endpoint: &str, request: GraphRequest) -> QueryResult<GraphResponse> {
        let bound = self
            .endpoints
            .get(endpoint)
            .ok_or_else(|| QueryError::UnknownEndpoint(endpoint.to_string()))?;

        let ctx = ExecutionContext::new(Arc::clone(&self.dataset))
            .with_credential(request.credential)
            .with_search(self.search.clone());
        let span = info_span!("request", request_id = %ctx.request_id(), endpoint);

        let resolutions = request
            .fields
            .iter()
            .map(|field| resolve_field(bound, &ctx, field));
        let results = ctx
            .run_request(join_all(resolutions))
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        let mut response = GraphResponse::default();
        for (field, result) in request.fields.iter().zip(results) {
            let key = field.response_key();
            match result {
                Ok(value) => {
                    response.data.insert(key.to_string(), value);
                }
                Err(err) => {
                    warn!(field = key, code = err.code(), error = %err, "field resolution failed");
                    response.data.insert(key.to_string(), Value::Null);
                    response.errors.push(FieldError::from_query_error(key, &err));
                }
            }
        }
        Ok(response)
    }
}

async fn resolve_field(
    endpoint: &Endpoint,
    ctx: &ExecutionContext,
    field: &FieldRequest,
) -> QueryResult<Value> {
    let resolver = endpoint
        .field(&field.name)
        .ok_or_else(|| QueryError::UnknownField {
            endpoint: endpoint.name().to_string(),
            field: field.name.clone(),
        })?;
    resolver.resolve(ctx, field).await
}
