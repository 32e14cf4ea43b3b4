//! In-memory snapshot store
//!
//! `MemoryQuadStore` keeps the whole dataset in one immutable snapshot behind
//! an `Arc`. Writers clone-on-write and publish a new version; a read
//! transaction holds on to the snapshot that was current when it began, so
//! it never observes later writes.
//!
//! Iteration order is insertion order. Subject, predicate and object indexes
//! narrow a pattern down to the smallest candidate list before matching.

use crate::error::{StoreError, StoreResult};
use crate::quad::{Pattern, Quad};
use crate::store::{GraphStore, QuadIter, ReadTransaction};
use crate::term::Term;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    version: u64,
    quads: Vec<Quad>,
    positions: HashMap<Quad, usize>,
    by_subject: HashMap<Term, Vec<usize>>,
    by_predicate: HashMap<Term, Vec<usize>>,
    by_object: HashMap<Term, Vec<usize>>,
}

impl Snapshot {
    fn insert(&mut self, quad: Quad) -> bool {
        if self.positions.contains_key(&quad) {
            return false;
        }
        let idx = self.quads.len();
        self.by_subject.entry(quad.subject.clone()).or_default().push(idx);
        self.by_predicate.entry(quad.predicate.clone()).or_default().push(idx);
        self.by_object.entry(quad.object.clone()).or_default().push(idx);
        self.positions.insert(quad.clone(), idx);
        self.quads.push(quad);
        true
    }

    fn remove(&mut self, quad: &Quad) -> bool {
        if !self.positions.contains_key(quad) {
            return false;
        }
        let kept: Vec<Quad> = self.quads.drain(..).filter(|q| q != quad).collect();
        let version = self.version;
        *self = Snapshot {
            version,
            ..Snapshot::default()
        };
        for q in kept {
            self.insert(q);
        }
        true
    }

    /// Smallest index list covering the pattern, `None` for a full scan
    fn candidates(&self, pattern: &Pattern) -> Option<&[usize]> {
        let lists = [
            pattern.subject.as_ref().map(|t| self.by_subject.get(t)),
            pattern.predicate.as_ref().map(|t| self.by_predicate.get(t)),
            pattern.object.as_ref().map(|t| self.by_object.get(t)),
        ];

        let mut best: Option<&[usize]> = None;
        for list in lists.into_iter().flatten() {
            let list = list.map(Vec::as_slice).unwrap_or(&[]);
            if best.map_or(true, |b| list.len() < b.len()) {
                best = Some(list);
            }
        }
        best
    }
}

/// In-memory [`GraphStore`] with snapshot isolation
#[derive(Debug, Default)]
pub struct MemoryQuadStore {
    current: RwLock<Arc<Snapshot>>,
    failure: RwLock<Option<StoreError>>,
    opened: AtomicUsize,
}

impl MemoryQuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `quads`
    pub fn with_quads(quads: impl IntoIterator<Item = Quad>) -> Self {
        let store = Self::new();
        store.extend(quads);
        store
    }

    /// Insert a quad, returning `false` if it was already present.
    pub fn insert(&self, quad: Quad) -> bool {
        let mut current = self.current.write();
        let snapshot = Arc::make_mut(&mut current);
        let inserted = snapshot.insert(quad);
        if inserted {
            snapshot.version += 1;
        }
        inserted
    }

    /// Insert many quads as one new version; returns how many were new.
    pub fn extend(&self, quads: impl IntoIterator<Item = Quad>) -> usize {
        let mut current = self.current.write();
        let snapshot = Arc::make_mut(&mut current);
        let added = quads
            .into_iter()
            .map(|q| snapshot.insert(q))
            .filter(|inserted| *inserted)
            .count();
        if added > 0 {
            snapshot.version += 1;
        }
        debug!(added, version = snapshot.version, "extended memory store");
        added
    }

    /// Remove a quad, returning `false` if it was absent.
    pub fn remove(&self, quad: &Quad) -> bool {
        let mut current = self.current.write();
        let snapshot = Arc::make_mut(&mut current);
        let removed = snapshot.remove(quad);
        if removed {
            snapshot.version += 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.current.read().quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Version of the latest published snapshot
    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// Make every read through transactions opened from now on fail with
    /// `error`. Pass `None` to restore normal behaviour.
    pub fn fail_reads_with(&self, error: Option<StoreError>) {
        *self.failure.write() = error;
    }

    /// Number of read transactions opened so far
    pub fn transactions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl GraphStore for MemoryQuadStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn begin_read(&self) -> StoreResult<Arc<dyn ReadTransaction>> {
        let snapshot = Arc::clone(&self.current.read());
        self.opened.fetch_add(1, Ordering::SeqCst);
        trace!(version = snapshot.version, "opened memory read transaction");
        Ok(Arc::new(MemoryTransaction {
            snapshot,
            failure: self.failure.read().clone(),
        }))
    }
}

/// Read transaction over one pinned snapshot
#[derive(Debug)]
pub struct MemoryTransaction {
    snapshot: Arc<Snapshot>,
    failure: Option<StoreError>,
}

impl MemoryTransaction {
    /// Version of the snapshot this transaction reads
    pub fn version(&self) -> u64 {
        self.snapshot.version
    }
}

impl ReadTransaction for MemoryTransaction {
    fn quads_matching(&self, pattern: &Pattern) -> QuadIter<'_> {
        if let Some(err) = &self.failure {
            return Box::new(std::iter::once(Err(err.clone())));
        }

        let pattern = pattern.clone();
        let quads = &self.snapshot.quads;
        match self.snapshot.candidates(&pattern) {
            Some(indices) => Box::new(
                indices
                    .iter()
                    .map(move |&i| &quads[i])
                    .filter(move |q| pattern.matches(q))
                    .cloned()
                    .map(Ok),
            ),
            None => Box::new(
                quads
                    .iter()
                    .filter(move |q| pattern.matches(q))
                    .cloned()
                    .map(Ok),
            ),
        }
    }
}
