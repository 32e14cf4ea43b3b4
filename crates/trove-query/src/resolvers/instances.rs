//! Instances of a class.
//!
//! An instance is any subject of `?x rdf:type <class>`, with no further
//! exclusion. A class typed `rdfs:Class` therefore counts as an instance
//! of itself when the class asked about is `rdfs:Class`.

use super::NodeSummary;
use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::QueryResult;
use crate::filter::FilterDimension;
use crate::pipeline::{PagingMode, QuadStream, QueryResolver};
use async_trait::async_trait;
use std::collections::HashSet;
use trove_core::{vocab, Pattern, QuadComponent, Term};

fn type_assertions<'t>(txn: &'t ReadHandle, class: &Term) -> QuadStream<'t> {
    txn.stream(
        &Pattern::any()
            .predicate(Term::iri(vocab::rdf::TYPE))
            .object(class.clone()),
    )
}

/// Drop repeated subjects, e.g. the same assertion in two graphs
fn distinct_subjects(stream: QuadStream<'_>) -> QuadStream<'_> {
    let mut seen: HashSet<Term> = HashSet::new();
    Box::new(stream.filter(move |item| match item {
        Ok(quad) => seen.insert(quad.subject.clone()),
        Err(_) => true,
    }))
}

/// Paged instances of the source class
#[derive(Debug, Clone, Copy, Default)]
pub struct Instances;

#[async_trait]
impl QueryResolver for Instances {
    type Source = Term;
    type Output = Vec<NodeSummary>;

    fn name(&self) -> &'static str {
        "instances"
    }

    fn filters_enabled(&self) -> bool {
        true
    }

    fn filter_dimensions(&self) -> &'static [FilterDimension] {
        &[FilterDimension::Domain, FilterDimension::Type]
    }

    fn type_endpoint(&self) -> QuadComponent {
        QuadComponent::Subject
    }

    fn select<'t>(
        &self,
        _ctx: &ExecutionContext,
        txn: &'t ReadHandle,
        source: &Term,
        _args: &Arguments,
    ) -> QueryResult<QuadStream<'t>> {
        Ok(distinct_subjects(type_assertions(txn, source)))
    }

    async fn map(
        &self,
        _ctx: &ExecutionContext,
        txn: &ReadHandle,
        _source: &Term,
        quads: QuadStream<'_>,
    ) -> QueryResult<Vec<NodeSummary>> {
        quads
            .map(|quad| NodeSummary::load(&quad?.subject, txn))
            .collect()
    }
}

/// Exact number of instances of the source class
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceCount;

#[async_trait]
impl QueryResolver for InstanceCount {
    type Source = Term;
    type Output = usize;

    fn name(&self) -> &'static str {
        "instanceCount"
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
        Ok(distinct_subjects(type_assertions(txn, source)))
    }

    async fn map(
        &self,
        _ctx: &ExecutionContext,
        _txn: &ReadHandle,
        _source: &Term,
        quads: QuadStream<'_>,
    ) -> QueryResult<usize> {
        quads.map(|quad| quad.map(|_| 1usize)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::QueryPipeline;
    use std::sync::Arc;
    use trove_core::{MemoryQuadStore, Quad};

    #[tokio::test]
    async fn test_same_assertion_in_two_graphs_counts_once() {
        let a = Term::iri("http://ex.org/a");
        let rdf_type = Term::iri(vocab::rdf::TYPE);
        let class = Term::iri("http://ex.org/C");
        let store = MemoryQuadStore::with_quads(vec![
            Quad::new(a.clone(), rdf_type.clone(), class.clone()).in_graph(Term::iri("g1")),
            Quad::new(a.clone(), rdf_type.clone(), class.clone()).in_graph(Term::iri("g2")),
        ]);
        let ctx = ExecutionContext::new(Arc::new(store));

        let count = QueryPipeline::default()
            .execute(&InstanceCount, &ctx, &class, &Arguments::new())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
