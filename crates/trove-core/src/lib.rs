//! # trove-core
//!
//! RDF data model and the graph store adapter seam.
//!
//! The query pipeline depends only on the traits in [`store`]; concrete
//! backends implement them. [`MemoryQuadStore`] is the in-process backend
//! with snapshot isolation.

pub mod error;
pub mod memory;
pub mod quad;
pub mod store;
pub mod term;
pub mod vocab;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryQuadStore, MemoryTransaction};
pub use quad::{GraphSelector, Pattern, Quad, QuadComponent};
pub use store::{run_in_read_transaction, GraphStore, QuadIter, ReadTransaction};
pub use term::{Literal, Term, TermKind};
