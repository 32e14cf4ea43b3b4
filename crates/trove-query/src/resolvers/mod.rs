//! Concrete resolvers built on the pipeline template.
//!
//! Each resolver only decides what to select and how to map the result;
//! filtering, paging and the transaction come from
//! [`QueryPipeline`](crate::pipeline::QueryPipeline).

mod classes;
mod facets;
mod instances;
mod literals;
mod node;
mod relationships;
mod search;

pub use classes::Classes;
pub use facets::{FacetBucket, TypeFacet};
pub use instances::{InstanceCount, Instances};
pub use literals::{LiteralStatement, Literals};
pub use node::{NodeField, NodeQuery, NodeResolver, NodeState};
pub use relationships::{Relationship, RelationshipCount, Relationships};
pub use search::{SearchNodes, SearchResultNode};

use crate::context::ReadHandle;
use crate::pipeline::QuadStream;
use crate::error::QueryResult;
use serde::Serialize;
use trove_core::{Pattern, Quad, QuadComponent, Term, TermKind};

/// Which side of a statement the source node is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Source is the subject
    Outgoing,
    /// Source is the object
    Incoming,
}

impl Direction {
    /// Pattern selecting every statement touching `node` in this direction
    pub fn pattern(&self, node: &Term) -> Pattern {
        match self {
            Self::Outgoing => Pattern::any().subject(node.clone()),
            Self::Incoming => Pattern::any().object(node.clone()),
        }
    }

    /// Position of the node at the far end of the edge
    pub fn other_endpoint(&self) -> QuadComponent {
        match self {
            Self::Outgoing => QuadComponent::Object,
            Self::Incoming => QuadComponent::Subject,
        }
    }

    pub(crate) fn other<'q>(&self, quad: &'q Quad) -> &'q Term {
        match self {
            Self::Outgoing => &quad.object,
            Self::Incoming => &quad.subject,
        }
    }
}

/// Statements linking `node` to another resource in `direction`.
///
/// Literal objects are dropped; they are served by [`Literals`].
pub(super) fn select_edges<'t>(direction: Direction, txn: &'t ReadHandle, node: &Term) -> QuadStream<'t> {
    let stream = txn.stream(&direction.pattern(node));
    match direction {
        Direction::Outgoing => Box::new(stream.filter(|item| {
            item.as_ref()
                .map(|quad| quad.object.is_resource())
                .unwrap_or(true)
        })),
        // subjects are always resources
        Direction::Incoming => stream,
    }
}

/// A node with its declared types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub id: String,
    pub kind: TermKind,
    pub types: Vec<String>,
}

impl NodeSummary {
    /// Summarise `node`, reading its types from `txn`.
    pub fn load(node: &Term, txn: &ReadHandle) -> QueryResult<Self> {
        let types = txn
            .types_of(node)?
            .iter()
            .map(|t| t.identity().into_owned())
            .collect();
        Ok(Self {
            id: node.identity().into_owned(),
            kind: node.kind(),
            types,
        })
    }
}
