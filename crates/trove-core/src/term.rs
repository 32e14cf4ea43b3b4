//! RDF term types: IRI, blank node, and literal
//!
//! Terms are opaque values produced by the store. The query layer only needs
//! to compare them, print them, and derive a string identity for filtering.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Literal value with optional language tag and datatype IRI
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub value: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Arc<str>>,
}

impl Literal {
    /// Plain literal without language or datatype
    pub fn new(value: impl AsRef<str>) -> Self {
        Self {
            value: Arc::from(value.as_ref()),
            language: None,
            datatype: None,
        }
    }

    pub fn with_language(mut self, language: impl AsRef<str>) -> Self {
        self.language = Some(Arc::from(language.as_ref()));
        self
    }

    pub fn with_datatype(mut self, datatype: impl AsRef<str>) -> Self {
        self.datatype = Some(Arc::from(datatype.as_ref()));
        self
    }

    /// Lexical form of the literal
    pub fn lexical(&self) -> &str {
        &self.value
    }
}

/// Kind of a term, as reported to GraphQL clients
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TermKind {
    Iri,
    BlankNode,
    Literal,
}

impl TermKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iri => "IRI",
            Self::BlankNode => "BLANK_NODE",
            Self::Literal => "LITERAL",
        }
    }
}

/// An RDF term
///
/// Serializes as `{"type": "iri", "value": "..."}` and friends.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// Absolute IRI, never prefixed
    Iri(Arc<str>),
    /// Blank node label without the `_:` prefix
    Blank(Arc<str>),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node. A leading `_:` is stripped.
    pub fn blank(label: impl AsRef<str>) -> Self {
        let label = label.as_ref();
        Term::Blank(Arc::from(label.strip_prefix("_:").unwrap_or(label)))
    }

    pub fn literal(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::new(value))
    }

    pub fn lang_literal(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Term::Literal(Literal::new(value).with_language(language))
    }

    pub fn typed_literal(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal(Literal::new(value).with_datatype(datatype))
    }

    /// Parse a client-supplied node reference.
    ///
    /// `_:label` becomes a blank node, anything else an IRI.
    pub fn from_reference(reference: &str) -> Self {
        if reference.starts_with("_:") {
            Term::blank(reference)
        } else {
            Term::iri(reference)
        }
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Iri(_) => TermKind::Iri,
            Term::Blank(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// IRIs and blank nodes can be the subject of a statement
    pub fn is_resource(&self) -> bool {
        !self.is_literal()
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// String identity used when comparing against filter value sets.
    ///
    /// IRI: the IRI itself. Blank node: `_:label`. Literal: its lexical form.
    pub fn identity(&self) -> Cow<'_, str> {
        match self {
            Term::Iri(iri) => Cow::Borrowed(iri),
            Term::Blank(label) => Cow::Owned(format!("_:{}", label)),
            Term::Literal(lit) => Cow::Borrowed(lit.lexical()),
        }
    }
}

impl fmt::Display for Term {
    /// N-Triples style rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => write!(f, "_:{}", label),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.value.escape_default())?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_per_kind() {
        assert_eq!(Term::iri("http://ex.org/a").identity(), "http://ex.org/a");
        assert_eq!(Term::blank("b0").identity(), "_:b0");
        assert_eq!(Term::blank("_:b0").identity(), "_:b0");
        assert_eq!(Term::lang_literal("hello", "en").identity(), "hello");
    }

    #[test]
    fn test_from_reference() {
        assert!(Term::from_reference("_:n1").is_blank());
        assert!(Term::from_reference("http://ex.org/n1").is_iri());
    }

    #[test]
    fn test_display_ntriples() {
        assert_eq!(Term::iri("http://ex.org/a").to_string(), "<http://ex.org/a>");
        assert_eq!(Term::lang_literal("hi", "en").to_string(), "\"hi\"@en");
        assert_eq!(
            Term::typed_literal("5", "http://www.w3.org/2001/XMLSchema#integer").to_string(),
            "\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Term::iri("http://ex.org/a")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "iri", "value": "http://ex.org/a"}));

        let back: Term = serde_json::from_value(json).unwrap();
        assert_eq!(back, Term::iri("http://ex.org/a"));
    }
}
