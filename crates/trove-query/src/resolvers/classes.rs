//! Ontology classes declared in the dataset

use super::NodeSummary;
use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::QueryResult;
use crate::filter::FilterDimension;
use crate::pipeline::{QuadStream, QueryResolver};
use async_trait::async_trait;
use std::collections::HashSet;
use trove_core::{vocab, Pattern, Term};

/// Nodes typed `rdfs:Class` or `owl:Class`, each listed once
#[derive(Debug, Clone, Copy, Default)]
pub struct Classes;

#[async_trait]
impl QueryResolver for Classes {
    type Source = ();
    type Output = Vec<NodeSummary>;

    fn name(&self) -> &'static str {
        "classes"
    }

    fn filters_enabled(&self) -> bool {
        true
    }

    fn filter_dimensions(&self) -> &'static [FilterDimension] {
        &[FilterDimension::Domain]
    }

    fn select<'t>(
        &self,
        _ctx: &ExecutionContext,
        txn: &'t ReadHandle,
        _source: &(),
        _args: &Arguments,
    ) -> QueryResult<QuadStream<'t>> {
        let rdf_type = Term::iri(vocab::rdf::TYPE);
        let declarations = [vocab::rdfs::CLASS, vocab::owl::CLASS]
            .into_iter()
            .flat_map(move |class| {
                txn.stream(
                    &Pattern::any()
                        .predicate(rdf_type.clone())
                        .object(Term::iri(class)),
                )
            });

        let mut seen: HashSet<Term> = HashSet::new();
        Ok(Box::new(declarations.filter(move |item| match item {
            Ok(quad) => seen.insert(quad.subject.clone()),
            Err(_) => true,
        })))
    }

    async fn map(
        &self,
        _ctx: &ExecutionContext,
        txn: &ReadHandle,
        _source: &(),
        quads: QuadStream<'_>,
    ) -> QueryResult<Vec<NodeSummary>> {
        quads
            .map(|quad| NodeSummary::load(&quad?.subject, txn))
            .collect()
    }
}
