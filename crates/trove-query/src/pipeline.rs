//! Query Pipeline
//!
//! Every paged, filterable resolver is a [`QueryResolver`]: it supplies a
//! selection (source node to quad stream) and a mapping (quad stream to
//! output). [`QueryPipeline::execute`] runs the fixed template around them:
//!
//! 1. validate arguments and build the filter chain, outside any transaction
//! 2. resolve the paging window (skipped for exhaustive resolvers)
//! 3. open or join the request's read transaction
//! 4. select, filter, page and map inside it
//!
//! Store errors propagate unchanged; nothing here retries.

use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::QueryResult;
use crate::filter::{parse_filter, Filter, FilterChain, FilterDimension, FilterSpec};
use crate::paging::{Limits, PageRequest, PagingPolicy};
use async_trait::async_trait;
use tracing::{debug, debug_span, Instrument};
use trove_config::PagingConfig;
use trove_core::{Quad, QuadComponent};

/// Lazy, fallible quad sequence flowing through the pipeline
pub type QuadStream<'a> = Box<dyn Iterator<Item = QueryResult<Quad>> + Send + 'a>;

/// How the pipeline bounds a resolver's filtered stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    /// Apply `limit`/`offset`
    Paged,
    /// Consume everything; used by counts and full facets
    Exhaustive,
}

/// A resolver specialised by the pipeline template
#[async_trait]
pub trait QueryResolver: Send + Sync {
    /// Object the field is resolved on
    type Source: Send + Sync;
    type Output: Send;

    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether filter arguments are read at all
    fn filters_enabled(&self) -> bool {
        false
    }

    /// Filter dimensions this resolver accepts
    fn filter_dimensions(&self) -> &'static [FilterDimension] {
        &FilterDimension::ALL
    }

    /// Node whose `rdf:type` the type filter inspects.
    ///
    /// Relationship resolvers point this at the other endpoint.
    fn type_endpoint(&self) -> QuadComponent {
        QuadComponent::Object
    }

    /// Concrete filter for a parsed dimension argument
    fn filter_for(&self, dimension: FilterDimension, spec: FilterSpec) -> Filter {
        match dimension {
            FilterDimension::Predicate => Filter::component(QuadComponent::Predicate, spec),
            FilterDimension::Domain => Filter::component(QuadComponent::Subject, spec),
            FilterDimension::Range => Filter::component(QuadComponent::Object, spec),
            FilterDimension::Type => Filter::of_type(self.type_endpoint(), spec),
        }
    }

    /// Resolver-specific limits; `None` uses the pipeline's
    fn limits(&self) -> Option<Limits> {
        None
    }

    fn paging_mode(&self) -> PagingMode {
        PagingMode::Paged
    }

    /// Argument checks run before the transaction opens
    fn validate(&self, _source: &Self::Source, _args: &Arguments) -> QueryResult<()> {
        Ok(())
    }

    /// Initial candidate stream for `source`
    fn select<'t>(
        &self,
        ctx: &ExecutionContext,
        txn: &'t ReadHandle,
        source: &Self::Source,
        args: &Arguments,
    ) -> QueryResult<QuadStream<'t>>;

    /// Turn the filtered, paged stream into the field's output
    async fn map(
        &self,
        ctx: &ExecutionContext,
        txn: &ReadHandle,
        source: &Self::Source,
        quads: QuadStream<'_>,
    ) -> QueryResult<Self::Output>;
}

/// The reusable execution template
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPipeline {
    limits: Limits,
}

impl QueryPipeline {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &PagingConfig) -> Self {
        Self::new((*config).into())
    }

    /// Default limits for resolvers that declare none
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Resolve one field through `resolver`.
    pub async fn execute<R>(
        &self,
        resolver: &R,
        ctx: &ExecutionContext,
        source: &R::Source,
        args: &Arguments,
    ) -> QueryResult<R::Output>
    where
        R: QueryResolver + ?Sized,
    {
        let span = debug_span!("pipeline", resolver = resolver.name());

        async move {
            resolver.validate(source, args)?;
            let filters = build_filters(resolver, args)?;
            let paging = match resolver.paging_mode() {
                PagingMode::Paged => PagingPolicy::resolve(
                    PageRequest::from_arguments(args)?,
                    resolver.limits().unwrap_or(self.limits),
                )?,
                PagingMode::Exhaustive => PagingPolicy::Unbounded,
            };
            debug!(filters = filters.len(), ?paging, "arguments accepted");

            ctx.with_read_transaction(|txn| async move {
                let selected = resolver.select(ctx, &txn, source, args)?;
                let filtered = filters.apply(selected, &txn);
                let paged = paging.apply(filtered);
                resolver.map(ctx, &txn, source, paged).await
            })
            .await
        }
        .instrument(span)
        .await
    }
}

/// Parse every enabled filter argument of `resolver` from `args`.
///
/// Absent arguments contribute nothing; malformed ones fail here, before
/// any store access.
pub fn build_filters<R>(resolver: &R, args: &Arguments) -> QueryResult<FilterChain>
where
    R: QueryResolver + ?Sized,
{
    let mut chain = FilterChain::new();
    if !resolver.filters_enabled() {
        return Ok(chain);
    }
    for dimension in resolver.filter_dimensions() {
        let argument = dimension.argument();
        if let Some(spec) = parse_filter(args.get(argument), argument)? {
            chain.push(resolver.filter_for(*dimension, spec));
        }
    }
    Ok(chain)
}
