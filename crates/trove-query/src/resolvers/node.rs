//! Single node lookup with selectable fields.
//!
//! Sub-fields are a closed set, [`NodeField`], parsed from the request's
//! selection before any store access. A name outside that set is a wiring
//! defect and surfaces as `UnsupportedField`, not as bad caller input.

use crate::args::Arguments;
use crate::context::{ExecutionContext, ReadHandle};
use crate::error::{QueryError, QueryResult};
use crate::pipeline::{PagingMode, QuadStream, QueryResolver};
use async_trait::async_trait;
use serde_json::{Map, Value};
use trove_core::{vocab, Pattern, Term};

const RESOLVER: &str = "node";

/// Field selectable on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    Id,
    Kind,
    Types,
    Label,
}

impl NodeField {
    pub const ALL: [NodeField; 4] = [
        NodeField::Id,
        NodeField::Kind,
        NodeField::Types,
        NodeField::Label,
    ];

    pub fn from_name(name: &str) -> QueryResult<Self> {
        match name {
            "id" => Ok(Self::Id),
            "kind" => Ok(Self::Kind),
            "types" => Ok(Self::Types),
            "label" => Ok(Self::Label),
            other => Err(QueryError::unsupported_field(RESOLVER, other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Kind => "kind",
            Self::Types => "types",
            Self::Label => "label",
        }
    }
}

/// Node reference plus the fields asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeQuery {
    pub node: Term,
    pub fields: Vec<NodeField>,
}

impl NodeQuery {
    /// An empty selection means every field.
    pub fn new(node: Term, fields: Vec<NodeField>) -> Self {
        let fields = if fields.is_empty() {
            NodeField::ALL.to_vec()
        } else {
            fields
        };
        Self { node, fields }
    }

    pub fn parse<S: AsRef<str>>(node: Term, selection: &[S]) -> QueryResult<Self> {
        let fields = selection
            .iter()
            .map(|name| NodeField::from_name(name.as_ref()))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Self::new(node, fields))
    }
}

/// Store-derived values of one node, read once when loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    node: Term,
    types: Vec<Term>,
    label: Option<String>,
}

impl NodeState {
    /// Read the values `fields` need from `txn`. Unselected values are left empty.
    pub fn load(node: Term, fields: &[NodeField], txn: &ReadHandle) -> QueryResult<Self> {
        let types = if fields.contains(&NodeField::Types) {
            txn.types_of(&node)?
        } else {
            Vec::new()
        };
        let label = if fields.contains(&NodeField::Label) {
            label_of(&node, txn)?
        } else {
            None
        };
        Ok(Self { node, types, label })
    }

    pub fn node(&self) -> &Term {
        &self.node
    }

    pub fn types(&self) -> &[Term] {
        &self.types
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn value(&self, field: NodeField) -> Value {
        match field {
            NodeField::Id => Value::String(self.node.identity().into_owned()),
            NodeField::Kind => Value::String(self.node.kind().as_str().to_string()),
            NodeField::Types => Value::Array(
                self.types
                    .iter()
                    .map(|t| Value::String(t.identity().into_owned()))
                    .collect(),
            ),
            NodeField::Label => self
                .label
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        }
    }
}

fn label_of(node: &Term, txn: &ReadHandle) -> QueryResult<Option<String>> {
    let pattern = Pattern::any()
        .subject(node.clone())
        .predicate(Term::iri(vocab::rdfs::LABEL));
    for quad in txn.quads_matching(&pattern) {
        if let Some(literal) = quad?.object.as_literal() {
            return Ok(Some(literal.lexical().to_string()));
        }
    }
    Ok(None)
}

/// Resolves a node, or `null` when the dataset never mentions it
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeResolver;

#[async_trait]
impl QueryResolver for NodeResolver {
    type Source = NodeQuery;
    type Output = Option<Map<String, Value>>;

    fn name(&self) -> &'static str {
        RESOLVER
    }

    fn paging_mode(&self) -> PagingMode {
        PagingMode::Exhaustive
    }

    fn select<'t>(
        &self,
        _ctx: &ExecutionContext,
        txn: &'t ReadHandle,
        source: &NodeQuery,
        _args: &Arguments,
    ) -> QueryResult<QuadStream<'t>> {
        Ok(txn.stream(&Pattern::any().subject(source.node.clone())))
    }

    async fn map(
        &self,
        _ctx: &ExecutionContext,
        txn: &ReadHandle,
        source: &NodeQuery,
        mut quads: QuadStream<'_>,
    ) -> QueryResult<Option<Map<String, Value>>> {
        let as_subject = quads.next().transpose()?.is_some();
        let mentioned =
            as_subject || txn.contains(&Pattern::any().object(source.node.clone()))?;
        if !mentioned {
            return Ok(None);
        }

        let state = NodeState::load(source.node.clone(), &source.fields, txn)?;
        Ok(Some(
            source
                .fields
                .iter()
                .map(|field| (field.as_str().to_string(), state.value(*field)))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::QueryPipeline;
    use serde_json::json;
    use std::sync::Arc;
    use trove_core::{MemoryQuadStore, Quad};

    fn dataset() -> Arc<MemoryQuadStore> {
        let a = Term::iri("http://ex.org/a");
        Arc::new(MemoryQuadStore::with_quads(vec![
            Quad::new(a.clone(), Term::iri(vocab::rdf::TYPE), Term::iri("http://ex.org/T")),
            Quad::new(a.clone(), Term::iri(vocab::rdfs::LABEL), Term::lang_literal("Alpha", "en")),
            Quad::new(Term::blank("x"), Term::iri("http://ex.org/p"), Term::iri("http://ex.org/only-object")),
        ]))
    }

    #[test]
    fn test_unknown_field_is_unsupported() {
        let err = NodeQuery::parse(Term::iri("http://ex.org/a"), &["id", "period"]).unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnsupportedField { ref resolver, ref field } if resolver == "node" && field == "period"
        ));
        assert!(!err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_node_fields() {
        let ctx = ExecutionContext::new(dataset());
        let query = NodeQuery::parse(Term::iri("http://ex.org/a"), &[] as &[&str]).unwrap();

        let node = QueryPipeline::default()
            .execute(&NodeResolver, &ctx, &query, &Arguments::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            Value::Object(node),
            json!({
                "id": "http://ex.org/a",
                "kind": "IRI",
                "types": ["http://ex.org/T"],
                "label": "Alpha",
            })
        );
    }

    #[tokio::test]
    async fn test_object_only_node_exists_and_unknown_is_null() {
        let pipeline = QueryPipeline::default();
        let store = dataset();

        let ctx = ExecutionContext::new(store.clone());
        let query = NodeQuery::parse(Term::iri("http://ex.org/only-object"), &["id"]).unwrap();
        let found = pipeline
            .execute(&NodeResolver, &ctx, &query, &Arguments::new())
            .await
            .unwrap();
        assert_eq!(found.unwrap().get("id"), Some(&json!("http://ex.org/only-object")));

        let ctx = ExecutionContext::new(store);
        let query = NodeQuery::parse(Term::iri("http://ex.org/missing"), &["id"]).unwrap();
        let missing = pipeline
            .execute(&NodeResolver, &ctx, &query, &Arguments::new())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_state_reads_only_selected_fields() {
        let store = dataset();
        let a = Term::iri("http://ex.org/a");

        let ctx = ExecutionContext::new(store.clone());
        let state = ctx
            .read(|txn| NodeState::load(a.clone(), &[NodeField::Types, NodeField::Label], txn))
            .unwrap();
        assert_eq!(state.types(), &[Term::iri("http://ex.org/T")]);
        assert_eq!(state.label(), Some("Alpha"));

        // reads now fail, so only selections that skip the store succeed
        store.fail_reads_with(Some(trove_core::StoreError::Io("offline".to_string())));
        let ctx = ExecutionContext::new(store.clone());
        let state = ctx
            .read(|txn| NodeState::load(a.clone(), &[NodeField::Id, NodeField::Kind], txn))
            .unwrap();
        assert!(state.types().is_empty());
        assert_eq!(state.value(NodeField::Id), json!("http://ex.org/a"));

        let ctx = ExecutionContext::new(store);
        let err = ctx
            .read(|txn| NodeState::load(a.clone(), &[NodeField::Types], txn))
            .unwrap_err();
        assert!(matches!(err, QueryError::Store(trove_core::StoreError::Io(_))));
    }
}
