//! Type facet over a node's relationships

use super::{select_edges, Direction};
use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::QueryResult;
use crate::pipeline::{PagingMode, QuadStream, QueryResolver};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use trove_core::{QuadComponent, Term};

/// Number of edges whose other endpoint has a given type
///
/// `value == None` groups endpoints without any type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetBucket {
    pub value: Option<String>,
    pub count: usize,
}

/// Full facet; consumes every filtered edge.
#[derive(Debug, Clone, Copy)]
pub struct TypeFacet {
    direction: Direction,
}

impl TypeFacet {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

#[async_trait]
impl QueryResolver for TypeFacet {
    type Source = Term;
    type Output = Vec<FacetBucket>;

    fn name(&self) -> &'static str {
        match self.direction {
            Direction::Outgoing => "outgoingTypeFacet",
            Direction::Incoming => "incomingTypeFacet",
        }
    }

    fn filters_enabled(&self) -> bool {
        true
    }

    fn type_endpoint(&self) -> QuadComponent {
        self.direction.other_endpoint()
    }

    fn paging_mode(&self) -> PagingMode {
        PagingMode::Exhaustive
    }

    fn select<'t>(
        &self,
        _ctx: &ExecutionContext,
        txn: &'t ReadHandle,
        source: &Term,
        _args: &Arguments,
    ) -> QueryResult<QuadStream<'t>> {
        Ok(select_edges(self.direction, txn, source))
    }

    async fn map(
        &self,
        _ctx: &ExecutionContext,
        txn: &ReadHandle,
        _source: &Term,
        quads: QuadStream<'_>,
    ) -> QueryResult<Vec<FacetBucket>> {
        let mut counts: HashMap<Option<String>, usize> = HashMap::new();
        for quad in quads {
            let quad = quad?;
            let types = txn.types_of(self.direction.other(&quad))?;
            if types.is_empty() {
                *counts.entry(None).or_default() += 1;
            }
            for ty in types {
                *counts.entry(Some(ty.identity().into_owned())).or_default() += 1;
            }
        }

        let mut buckets: Vec<FacetBucket> = counts
            .into_iter()
            .map(|(value, count)| FacetBucket { value, count })
            .collect();
        // largest first, then by value with the untyped bucket last
        buckets.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.value.is_none().cmp(&b.value.is_none()))
                .then_with(|| a.value.cmp(&b.value))
        });
        Ok(buckets)
    }
}
