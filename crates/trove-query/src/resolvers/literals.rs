//! Literal-valued statements about a node

use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::QueryResult;
use crate::filter::FilterDimension;
use crate::pipeline::{QuadStream, QueryResolver};
use async_trait::async_trait;
use serde::Serialize;
use trove_core::{Pattern, Term};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralStatement {
    pub predicate: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

/// Paged literal values of the source node; predicate filter only
#[derive(Debug, Clone, Copy, Default)]
pub struct Literals;

#[async_trait]
impl QueryResolver for Literals {
    type Source = Term;
    type Output = Vec<LiteralStatement>;

    fn name(&self) -> &'static str {
        "literals"
    }

    fn filters_enabled(&self) -> bool {
        true
    }

    fn filter_dimensions(&self) -> &'static [FilterDimension] {
        &[FilterDimension::Predicate]
    }

    fn select<'t>(
        &self,
        _ctx: &ExecutionContext,
        txn: &'t ReadHandle,
        source: &Term,
        _args: &Arguments,
    ) -> QueryResult<QuadStream<'t>> {
        let stream = txn.stream(&Pattern::any().subject(source.clone()));
        Ok(Box::new(stream.filter(|item| {
            item.as_ref()
                .map(|quad| quad.object.is_literal())
                .unwrap_or(true)
        })))
    }

    async fn map(
        &self,
        _ctx: &ExecutionContext,
        _txn: &ReadHandle,
        _source: &Term,
        quads: QuadStream<'_>,
    ) -> QueryResult<Vec<LiteralStatement>> {
        quads
            .filter_map(|quad| {
                let quad = match quad {
                    Ok(quad) => quad,
                    Err(e) => return Some(Err(e)),
                };
                let literal = quad.object.as_literal()?;
                Some(Ok(LiteralStatement {
                    predicate: quad.predicate.identity().into_owned(),
                    value: literal.lexical().to_string(),
                    language: literal.language.as_deref().map(str::to_string),
                    datatype: literal.datatype.as_deref().map(str::to_string),
                }))
            })
            .collect()
    }
}
