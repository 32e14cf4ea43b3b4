//! Relationships between resources, and their counts.
//!
//! A relationship is a statement whose other endpoint is a resource; literal
//! values are served by [`Literals`](super::Literals) instead. The type
//! filter inspects the other endpoint's types, never the source node's.

use super::{select_edges, Direction, NodeSummary};
use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::QueryResult;
use crate::pipeline::{PagingMode, QuadStream, QueryResolver};
use async_trait::async_trait;
use serde::Serialize;
use trove_core::{QuadComponent, Term};

/// One edge, seen from the source node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub predicate: String,
    pub node: NodeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
}

/// Paged edges from or to a node
#[derive(Debug, Clone, Copy)]
pub struct Relationships {
    direction: Direction,
}

impl Relationships {
    pub fn outgoing() -> Self {
        Self {
            direction: Direction::Outgoing,
        }
    }

    pub fn incoming() -> Self {
        Self {
            direction: Direction::Incoming,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[async_trait]
impl QueryResolver for Relationships {
    type Source = Term;
    type Output = Vec<Relationship>;

    fn name(&self) -> &'static str {
        match self.direction {
            Direction::Outgoing => "outgoing",
            Direction::Incoming => "incoming",
        }
    }

    fn filters_enabled(&self) -> bool {
        true
    }

    fn type_endpoint(&self) -> QuadComponent {
        self.direction.other_endpoint()
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
    ) -> QueryResult<Vec<Relationship>> {
        quads
            .map(|quad| {
                let quad = quad?;
                Ok(Relationship {
                    predicate: quad.predicate.identity().into_owned(),
                    node: NodeSummary::load(self.direction.other(&quad), txn)?,
                    graph: quad.graph.as_ref().map(|g| g.identity().into_owned()),
                })
            })
            .collect()
    }
}

/// Exact number of edges after filtering; ignores paging arguments.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipCount {
    direction: Direction,
}

impl RelationshipCount {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }
}

#[async_trait]
impl QueryResolver for RelationshipCount {
    type Source = Term;
    type Output = usize;

    fn name(&self) -> &'static str {
        match self.direction {
            Direction::Outgoing => "outgoingCount",
            Direction::Incoming => "incomingCount",
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
        _txn: &ReadHandle,
        _source: &Term,
        quads: QuadStream<'_>,
    ) -> QueryResult<usize> {
        let mut count = 0;
        for quad in quads {
            quad?;
            count += 1;
        }
        Ok(count)
    }
}
