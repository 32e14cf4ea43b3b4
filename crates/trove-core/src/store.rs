//! Graph Store Adapter traits
//!
//! The store is the only component that owns quads and indexes. Everything
//! above it reads through a [`ReadTransaction`], which pins one consistent
//! snapshot of the dataset for as long as it is alive.
//!
//! ## Usage Example
//!
//! ```rust
//! use trove_core::{run_in_read_transaction, MemoryQuadStore, Pattern, Quad, Term};
//!
//! let store = MemoryQuadStore::new();
//! store.insert(Quad::new(
//!     Term::iri("http://ex.org/s"),
//!     Term::iri("http://ex.org/p"),
//!     Term::literal("o"),
//! ));
//!
//! let count = run_in_read_transaction(&store, |txn| {
//!     txn.quads_matching(&Pattern::any()).collect::<Result<Vec<_>, _>>().map(|q| q.len())
//! })?;
//! assert_eq!(count, 1);
//! # Ok::<(), trove_core::StoreError>(())
//! ```

use crate::error::StoreResult;
use crate::quad::{Pattern, Quad};
use std::sync::Arc;

/// Lazy sequence of quads produced by a store
pub type QuadIter<'a> = Box<dyn Iterator<Item = StoreResult<Quad>> + Send + 'a>;

/// A dataset that can hand out read transactions
///
/// Implementations must allow any number of concurrent readers; a read
/// transaction never takes an exclusive lock.
pub trait GraphStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str {
        "graph-store"
    }

    /// Open a read transaction pinned to the current snapshot.
    fn begin_read(&self) -> StoreResult<Arc<dyn ReadTransaction>>;
}

/// A read-only, snapshot-consistent view of a dataset
///
/// Shared across threads: sibling GraphQL fields may read through the same
/// transaction concurrently.
pub trait ReadTransaction: Send + Sync {
    /// Stream every quad matching `pattern`, in the store's native order.
    fn quads_matching(&self, pattern: &Pattern) -> QuadIter<'_>;

    /// Whether any quad matches `pattern`.
    fn contains(&self, pattern: &Pattern) -> StoreResult<bool> {
        match self.quads_matching(pattern).next() {
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e),
            None => Ok(false),
        }
    }
}

impl<S: GraphStore + ?Sized> GraphStore for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn begin_read(&self) -> StoreResult<Arc<dyn ReadTransaction>> {
        (**self).begin_read()
    }
}

/// Run `f` inside a fresh read transaction on `store`.
///
/// The transaction is released when `f` returns, whatever the outcome.
/// Request-scoped, nestable transactions live in the query crate's
/// execution context; this is the plain adapter-level form.
pub fn run_in_read_transaction<S, T, F>(store: &S, f: F) -> StoreResult<T>
where
    S: GraphStore + ?Sized,
    F: FnOnce(&dyn ReadTransaction) -> StoreResult<T>,
{
    let txn = store.begin_read()?;
    f(txn.as_ref())
}
