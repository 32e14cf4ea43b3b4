//! Filter Abstraction
//!
//! Filters are conjunctive include/exclude predicates over a quad stream.
//! Each one constrains a single dimension:
//!
//! | Dimension   | Argument          | Default filter                       |
//! |-------------|-------------------|--------------------------------------|
//! | `Predicate` | `predicateFilter` | predicate component                  |
//! | `Domain`    | `domainFilter`    | subject component                    |
//! | `Range`     | `rangeFilter`     | object component                     |
//! | `Type`      | `typeFilter`      | `rdf:type` of a resolver-chosen node |
//!
//! The wire shape of every filter argument is
//! `{ "mode": "INCLUDE" | "EXCLUDE", "values": ["...", ...] }`, with
//! `mode` defaulting to `INCLUDE` and `values` required and non-empty.
//! An absent or `null` argument means the [`Filter::Identity`] filter.

use crate::args::json_type;
use crate::context::ReadHandle;
use crate::error::{QueryError, QueryResult};
use crate::pipeline::QuadStream;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::trace;
use trove_core::{vocab, Pattern, Quad, QuadComponent, Term};

/// Whether matching quads are kept or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

impl FilterMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INCLUDE" => Some(Self::Include),
            "EXCLUDE" => Some(Self::Exclude),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "INCLUDE",
            Self::Exclude => "EXCLUDE",
        }
    }

    /// Decision for a candidate given its value-set membership
    fn admits(self, member: bool) -> bool {
        match self {
            Self::Include => member,
            Self::Exclude => !member,
        }
    }
}

/// Dimension a filter argument constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    Predicate,
    Domain,
    Range,
    Type,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] = [
        FilterDimension::Predicate,
        FilterDimension::Domain,
        FilterDimension::Range,
        FilterDimension::Type,
    ];

    /// GraphQL argument carrying this dimension's filter
    pub fn argument(&self) -> &'static str {
        match self {
            Self::Predicate => "predicateFilter",
            Self::Domain => "domainFilter",
            Self::Range => "rangeFilter",
            Self::Type => "typeFilter",
        }
    }
}

/// Ways a filter argument can be malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterSyntaxError {
    #[error("filter must be an object with 'mode' and 'values', got {0}")]
    NotAnObject(&'static str),

    #[error("unknown filter mode '{0}', expected INCLUDE or EXCLUDE")]
    UnknownMode(String),

    #[error("filter is missing the 'values' list")]
    MissingValues,

    #[error("filter 'values' must be a list, got {0}")]
    ValuesNotAList(&'static str),

    #[error("filter 'values' entries must be strings, got {0}")]
    NonStringValue(&'static str),

    #[error("must specify some values to include/exclude")]
    EmptyValues,
}

impl FilterSyntaxError {
    fn into_query_error(self, argument: &str) -> QueryError {
        QueryError::invalid_argument(argument, self.to_string())
    }
}

/// Non-empty set of term identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet(HashSet<String>);

impl ValueSet {
    pub fn new<I, S>(values: I) -> Result<Self, FilterSyntaxError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            return Err(FilterSyntaxError::EmptyValues);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.0.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Parsed filter argument: a mode plus its value set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub mode: FilterMode,
    pub values: ValueSet,
}

impl FilterSpec {
    pub fn new(mode: FilterMode, values: ValueSet) -> Self {
        Self { mode, values }
    }

    pub fn include<I, S>(values: I) -> Result<Self, FilterSyntaxError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(FilterMode::Include, ValueSet::new(values)?))
    }

    pub fn exclude<I, S>(values: I) -> Result<Self, FilterSyntaxError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(FilterMode::Exclude, ValueSet::new(values)?))
    }

    fn admits(&self, member: bool) -> bool {
        self.mode.admits(member)
    }
}

/// Parse one raw filter argument.
///
/// `None` and `null` mean "no constraint". Errors are reported against
/// `argument`, the GraphQL argument name.
pub fn parse_filter(raw: Option<&Value>, argument: &str) -> QueryResult<Option<FilterSpec>> {
    let object = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(object)) => object,
        Some(other) => {
            return Err(FilterSyntaxError::NotAnObject(json_type(other)).into_query_error(argument))
        }
    };

    let mode = match object.get("mode") {
        None | Some(Value::Null) => FilterMode::default(),
        Some(Value::String(raw_mode)) => FilterMode::parse(raw_mode).ok_or_else(|| {
            FilterSyntaxError::UnknownMode(raw_mode.clone()).into_query_error(argument)
        })?,
        Some(other) => {
            return Err(
                FilterSyntaxError::UnknownMode(other.to_string()).into_query_error(argument)
            )
        }
    };

    let entries = match object.get("values") {
        None | Some(Value::Null) => {
            return Err(FilterSyntaxError::MissingValues.into_query_error(argument))
        }
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(
                FilterSyntaxError::ValuesNotAList(json_type(other)).into_query_error(argument)
            )
        }
    };

    let values = entries
        .iter()
        .map(|entry| match entry {
            Value::String(s) => Ok(s.clone()),
            other => Err(FilterSyntaxError::NonStringValue(json_type(other))),
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(ValueSet::new)
        .map_err(|e| e.into_query_error(argument))?;

    Ok(Some(FilterSpec::new(mode, values)))
}

/// A composable predicate over a quad stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// Passes every quad unchanged
    #[default]
    Identity,
    /// Compares one quad component's identity against the value set
    Component {
        component: QuadComponent,
        spec: FilterSpec,
    },
    /// Compares the `rdf:type` objects of the node at `endpoint`
    Type {
        endpoint: QuadComponent,
        spec: FilterSpec,
    },
}

impl Filter {
    pub fn component(component: QuadComponent, spec: FilterSpec) -> Self {
        Self::Component { component, spec }
    }

    pub fn of_type(endpoint: QuadComponent, spec: FilterSpec) -> Self {
        Self::Type { endpoint, spec }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Relative evaluation cost; cheaper filters run first.
    pub fn cost(&self) -> u8 {
        match self {
            Self::Identity => 0,
            Self::Component { .. } => 1,
            // one extra pattern lookup per candidate
            Self::Type { .. } => 2,
        }
    }

    /// Whether `quad` survives this filter.
    pub fn accepts(&self, quad: &Quad, txn: &ReadHandle) -> QueryResult<bool> {
        match self {
            Self::Identity => Ok(true),
            Self::Component { component, spec } => {
                let member = quad
                    .component(*component)
                    .is_some_and(|term| spec.values.contains(&term.identity()));
                Ok(spec.admits(member))
            }
            Self::Type { endpoint, spec } => {
                let member = match quad.component(*endpoint) {
                    Some(node) => has_type_in(node, &spec.values, txn)?,
                    None => false,
                };
                Ok(spec.admits(member))
            }
        }
    }

    /// Lazily filter `stream`. Errors already in the stream pass through.
    pub fn apply<'a>(self, stream: QuadStream<'a>, txn: &'a ReadHandle) -> QuadStream<'a> {
        if self.is_identity() {
            return stream;
        }
        Box::new(stream.filter_map(move |item| {
            let quad = match item {
                Ok(quad) => quad,
                Err(e) => return Some(Err(e)),
            };
            match self.accepts(&quad, txn) {
                Ok(true) => Some(Ok(quad)),
                Ok(false) => {
                    trace!(quad = %quad, filter = %self, "dropped by filter");
                    None
                }
                Err(e) => Some(Err(e)),
            }
        }))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Component { component, spec } => {
                write!(f, "{:?} {}", component, spec.mode.as_str())
            }
            Self::Type { endpoint, spec } => {
                write!(f, "type of {:?} {}", endpoint, spec.mode.as_str())
            }
        }
    }
}

/// Literals have no types; resources are checked against `rdf:type`.
fn has_type_in(node: &Term, values: &ValueSet, txn: &ReadHandle) -> QueryResult<bool> {
    if node.is_literal() {
        return Ok(false);
    }
    let pattern = Pattern::any()
        .subject(node.clone())
        .predicate(Term::iri(vocab::rdf::TYPE));

    for quad in txn.quads_matching(&pattern) {
        if values.contains(&quad?.object.identity()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Ordered conjunction of filters
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, keeping the chain ordered by cost.
    ///
    /// Identity filters constrain nothing and are not stored.
    pub fn push(&mut self, filter: Filter) {
        if filter.is_identity() {
            return;
        }
        let at = self
            .filters
            .partition_point(|existing| existing.cost() <= filter.cost());
        self.filters.insert(at, filter);
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Apply every filter in order
    pub fn apply<'a>(self, stream: QuadStream<'a>, txn: &'a ReadHandle) -> QuadStream<'a> {
        self.filters
            .into_iter()
            .fold(stream, |stream, filter| filter.apply(stream, txn))
    }
}

impl FromIterator<Filter> for FilterChain {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        let mut chain = Self::new();
        for filter in iter {
            chain.push(filter);
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::error::QueryResult;
    use serde_json::json;
    use std::sync::Arc;
    use test_case::test_case;
    use trove_core::MemoryQuadStore;

    fn reason(err: QueryError) -> String {
        match err {
            QueryError::InvalidArgument { reason, .. } => reason,
            other => panic!("expected invalid argument, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_and_null_are_identity() {
        assert_eq!(parse_filter(None, "typeFilter").unwrap(), None);
        assert_eq!(parse_filter(Some(&Value::Null), "typeFilter").unwrap(), None);
    }

    #[test]
    fn test_mode_defaults_to_include() {
        let raw = json!({"values": ["http://ex.org/t"]});
        let spec = parse_filter(Some(&raw), "typeFilter").unwrap().unwrap();
        assert_eq!(spec.mode, FilterMode::Include);
        assert!(spec.values.contains("http://ex.org/t"));
    }

    #[test_case(json!("INCLUDE"), FilterSyntaxError::NotAnObject("string") ; "not an object")]
    #[test_case(json!({"mode": "MAYBE", "values": ["a"]}), FilterSyntaxError::UnknownMode("MAYBE".into()) ; "unknown mode")]
    #[test_case(json!({"mode": "INCLUDE"}), FilterSyntaxError::MissingValues ; "missing values")]
    #[test_case(json!({"values": "a"}), FilterSyntaxError::ValuesNotAList("string") ; "values not a list")]
    #[test_case(json!({"values": ["a", 3]}), FilterSyntaxError::NonStringValue("number") ; "non string entry")]
    #[test_case(json!({"mode": "INCLUDE", "values": []}), FilterSyntaxError::EmptyValues ; "empty include")]
    #[test_case(json!({"mode": "EXCLUDE", "values": []}), FilterSyntaxError::EmptyValues ; "empty exclude")]
    fn test_malformed_filters(raw: Value, expected: FilterSyntaxError) {
        let err = parse_filter(Some(&raw), "predicateFilter").unwrap_err();
        assert!(matches!(
            &err,
            QueryError::InvalidArgument { argument, .. } if argument == "predicateFilter"
        ));
        assert_eq!(reason(err), expected.to_string());
    }

    #[test]
    fn test_empty_values_message() {
        assert_eq!(
            FilterSyntaxError::EmptyValues.to_string(),
            "must specify some values to include/exclude"
        );
    }

    #[test]
    fn test_chain_orders_by_cost_and_skips_identity() {
        let spec = FilterSpec::include(["x"]).unwrap();
        let chain: FilterChain = [
            Filter::of_type(QuadComponent::Object, spec.clone()),
            Filter::Identity,
            Filter::component(QuadComponent::Predicate, spec.clone()),
        ]
        .into_iter()
        .collect();

        let costs: Vec<u8> = chain.iter().map(Filter::cost).collect();
        assert_eq!(costs, vec![1, 2]);
    }

    #[test]
    fn test_component_filter_on_default_graph() {
        let ctx = ExecutionContext::new(Arc::new(MemoryQuadStore::new()));
        let quad = Quad::new(Term::iri("s"), Term::iri("p"), Term::iri("o"));
        let spec = FilterSpec::include(["g"]).unwrap();

        let accepted = ctx
            .read(|txn| Filter::component(QuadComponent::Graph, spec).accepts(&quad, txn))
            .unwrap();
        assert!(!accepted);
    }

    #[test]
    fn test_type_filter_on_literal_endpoint() {
        let ctx = ExecutionContext::new(Arc::new(MemoryQuadStore::new()));
        let quad = Quad::new(Term::iri("s"), Term::iri("p"), Term::literal("o"));

        let (include, exclude) = ctx
            .read(|txn| -> QueryResult<_> {
                let include = Filter::of_type(
                    QuadComponent::Object,
                    FilterSpec::include(["http://ex.org/T"]).unwrap(),
                )
                .accepts(&quad, txn)?;
                let exclude = Filter::of_type(
                    QuadComponent::Object,
                    FilterSpec::exclude(["http://ex.org/T"]).unwrap(),
                )
                .accepts(&quad, txn)?;
                Ok((include, exclude))
            })
            .unwrap();

        assert!(!include);
        assert!(exclude);
    }

    #[test]
    fn test_blank_node_identity_matches_reference() {
        let ctx = ExecutionContext::new(Arc::new(MemoryQuadStore::new()));
        let quad = Quad::new(Term::blank("b0"), Term::iri("p"), Term::iri("o"));
        let spec = FilterSpec::include(["_:b0"]).unwrap();

        let accepted = ctx
            .read(|txn| Filter::component(QuadComponent::Subject, spec).accepts(&quad, txn))
            .unwrap();
        assert!(accepted);
    }
}
