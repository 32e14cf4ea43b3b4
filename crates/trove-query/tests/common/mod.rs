//! Shared fixtures for trove-query integration tests
#![allow(dead_code)]

use std::sync::Arc;
use trove_core::{vocab, MemoryQuadStore, Quad, Term};

pub fn ex(local: &str) -> Term {
    Term::iri(format!("http://ex.org/{}", local))
}

pub fn rdf_type() -> Term {
    Term::iri(vocab::rdf::TYPE)
}

/// `s p1 o1`, `s p2 _:o2`, `s p3 o3`, with `o1` and `_:o2` typed `t1`
pub fn typed_neighbours() -> Arc<MemoryQuadStore> {
    Arc::new(MemoryQuadStore::with_quads(vec![
        Quad::new(ex("s"), ex("p1"), ex("o1")),
        Quad::new(ex("s"), ex("p2"), Term::blank("o2")),
        Quad::new(ex("s"), ex("p3"), ex("o3")),
        Quad::new(ex("o1"), rdf_type(), ex("t1")),
        Quad::new(Term::blank("o2"), rdf_type(), ex("t1")),
    ]))
}

/// `hub` linked to `n1..=n{count}` in that order
pub fn hub_with_edges(count: usize) -> Arc<MemoryQuadStore> {
    Arc::new(MemoryQuadStore::with_quads((1..=count).map(|i| {
        Quad::new(ex("hub"), ex("links"), ex(&format!("n{}", i)))
    })))
}

/// Local names of relationship targets in a serialized response
pub fn target_ids(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["node"]["id"].as_str())
                .map(|id| id.trim_start_matches("http://ex.org/").to_string())
                .collect()
        })
        .unwrap_or_default()
}
