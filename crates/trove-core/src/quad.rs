//! Quads and quad patterns

use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a term within a quad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadComponent {
    Graph,
    Subject,
    Predicate,
    Object,
}

/// An RDF statement in a named or default graph
///
/// `graph == None` is the default graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Quad {
    /// Statement in the default graph
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            graph: None,
            subject,
            predicate,
            object,
        }
    }

    pub fn in_graph(mut self, graph: Term) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Term at the given position. Only the graph can be absent.
    pub fn component(&self, component: QuadComponent) -> Option<&Term> {
        match component {
            QuadComponent::Graph => self.graph.as_ref(),
            QuadComponent::Subject => Some(&self.subject),
            QuadComponent::Predicate => Some(&self.predicate),
            QuadComponent::Object => Some(&self.object),
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {}", graph)?;
        }
        write!(f, " .")
    }
}

/// Which graphs a pattern should range over
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GraphSelector {
    /// Any graph, default included
    #[default]
    Any,
    /// Only the default graph
    Default,
    /// Only the named graph
    Named(Term),
}

impl GraphSelector {
    pub fn matches(&self, graph: Option<&Term>) -> bool {
        match self {
            GraphSelector::Any => true,
            GraphSelector::Default => graph.is_none(),
            GraphSelector::Named(name) => graph == Some(name),
        }
    }
}

/// A quad template; `None` components are wildcards
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub graph: GraphSelector,
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
}

impl Pattern {
    /// Pattern matching every quad
    pub fn any() -> Self {
        Self::default()
    }

    pub fn graph(mut self, graph: GraphSelector) -> Self {
        self.graph = graph;
        self
    }

    pub fn subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn predicate(mut self, predicate: Term) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.graph == GraphSelector::Any
            && self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
    }

    pub fn matches(&self, quad: &Quad) -> bool {
        fn slot(bound: &Option<Term>, term: &Term) -> bool {
            bound.as_ref().map_or(true, |b| b == term)
        }

        self.graph.matches(quad.graph.as_ref())
            && slot(&self.subject, &quad.subject)
            && slot(&self.predicate, &quad.predicate)
            && slot(&self.object, &quad.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Quad {
        Quad::new(
            Term::iri("http://ex.org/s"),
            Term::iri("http://ex.org/p"),
            Term::literal("o"),
        )
    }

    #[test]
    fn test_wildcard_matches_everything() {
        assert!(Pattern::any().is_wildcard());
        assert!(Pattern::any().matches(&quad()));
        assert!(Pattern::any().matches(&quad().in_graph(Term::iri("http://ex.org/g"))));
    }

    #[test]
    fn test_bound_components() {
        let q = quad();
        assert!(Pattern::any().subject(Term::iri("http://ex.org/s")).matches(&q));
        assert!(!Pattern::any().subject(Term::iri("http://ex.org/x")).matches(&q));
        assert!(Pattern::any().object(Term::literal("o")).matches(&q));
    }

    #[test]
    fn test_graph_selector() {
        let named = quad().in_graph(Term::iri("http://ex.org/g"));
        assert!(!Pattern::any().graph(GraphSelector::Default).matches(&named));
        assert!(Pattern::any()
            .graph(GraphSelector::Named(Term::iri("http://ex.org/g")))
            .matches(&named));
        assert!(Pattern::any().graph(GraphSelector::Default).matches(&quad()));
    }

    #[test]
    fn test_component_access() {
        let q = quad();
        assert_eq!(q.component(QuadComponent::Graph), None);
        assert_eq!(q.component(QuadComponent::Object), Some(&Term::literal("o")));
    }
}
