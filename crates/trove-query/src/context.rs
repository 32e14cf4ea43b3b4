//! Execution Context and the request-scoped read transaction
//!
//! One [`ExecutionContext`] is built per GraphQL request and cloned into
//! every field resolution. It owns a [`TransactionScope`] with a one-way
//! lifecycle:
//!
//! ```text
//! NotStarted --first with_read_transaction--> Active --outermost exit--> Closed
//! ```
//!
//! Nested calls reuse the enclosing transaction. `Closed` is terminal: a
//! later call, or a read through a handle that outlived the scope, fails
//! with [`StoreError::TransactionClosed`].
//!
//! [`ExecutionContext::run_request`] pins the scope for a whole request so
//! that sibling root fields resolved one after another still share one
//! snapshot. The transaction itself is still opened lazily by the first
//! read.

use crate::error::QueryResult;
use crate::pipeline::QuadStream;
use crate::search::SearchClient;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use trove_core::{
    vocab, GraphStore, Pattern, QuadIter, ReadTransaction, StoreError, StoreResult, Term,
};
use uuid::Uuid;

/// Opaque credential forwarded to downstream collaborators
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialToken(Arc<str>);

impl CredentialToken {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(Arc::from(token.as_ref()))
    }

    /// Raw token value, for forwarding only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialToken(<redacted>)")
    }
}

/// Observable lifecycle of a request's read transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    NotStarted,
    Active,
    Closed,
}

enum Slot {
    NotStarted,
    Active {
        txn: Arc<dyn ReadTransaction>,
        depth: usize,
    },
    Closed,
}

struct ScopeState {
    slot: Slot,
    pins: usize,
}

/// Request-scoped, nestable read transaction
pub struct TransactionScope {
    state: Mutex<ScopeState>,
    closed: AtomicBool,
}

impl TransactionScope {
    fn new() -> Self {
        Self {
            state: Mutex::new(ScopeState {
                slot: Slot::NotStarted,
                pins: 0,
            }),
            closed: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> TransactionState {
        match self.state.lock().slot {
            Slot::NotStarted => TransactionState::NotStarted,
            Slot::Active { .. } => TransactionState::Active,
            Slot::Closed => TransactionState::Closed,
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Enter the scope, opening the transaction on first use.
    fn enter(self: &Arc<Self>, dataset: &dyn GraphStore) -> StoreResult<(ReadHandle, ScopeGuard)> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let txn = match &mut state.slot {
            Slot::Closed => return Err(StoreError::TransactionClosed),
            Slot::Active { txn, depth } => {
                *depth += 1;
                trace!(depth = *depth, "reusing enclosing read transaction");
                Arc::clone(txn)
            }
            Slot::NotStarted => {
                let txn = dataset.begin_read()?;
                debug!(store = dataset.name(), "opened read transaction");
                state.slot = Slot::Active {
                    txn: Arc::clone(&txn),
                    depth: 1,
                };
                txn
            }
        };

        let handle = ReadHandle {
            txn,
            scope: Arc::clone(self),
        };
        Ok((
            handle,
            ScopeGuard {
                scope: Arc::clone(self),
            },
        ))
    }

    fn exit(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let close = match &mut state.slot {
            Slot::Active { depth, .. } => {
                *depth = depth.saturating_sub(1);
                *depth == 0 && state.pins == 0
            }
            _ => false,
        };
        if close {
            self.close(state);
        }
    }

    fn pin(self: &Arc<Self>) -> RequestPin {
        self.state.lock().pins += 1;
        RequestPin {
            scope: Arc::clone(self),
        }
    }

    fn unpin(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.pins = state.pins.saturating_sub(1);
        if state.pins > 0 {
            return;
        }
        let idle = matches!(
            state.slot,
            Slot::NotStarted | Slot::Active { depth: 0, .. }
        );
        if idle {
            self.close(state);
        }
    }

    fn close(&self, state: &mut ScopeState) {
        state.slot = Slot::Closed;
        self.closed.store(true, Ordering::Release);
        debug!("closed read transaction");
    }
}

/// Leaves the scope when dropped, on success, error or cancellation
struct ScopeGuard {
    scope: Arc<TransactionScope>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.exit();
    }
}

struct RequestPin {
    scope: Arc<TransactionScope>,
}

impl Drop for RequestPin {
    fn drop(&mut self) {
        self.scope.unpin();
    }
}

/// Read access valid only while the enclosing scope is open
#[derive(Clone)]
pub struct ReadHandle {
    txn: Arc<dyn ReadTransaction>,
    scope: Arc<TransactionScope>,
}

impl ReadHandle {
    pub fn quads_matching(&self, pattern: &Pattern) -> QuadIter<'_> {
        if self.scope.is_closed() {
            return Box::new(std::iter::once(Err(StoreError::TransactionClosed)));
        }
        self.txn.quads_matching(pattern)
    }

    pub fn contains(&self, pattern: &Pattern) -> StoreResult<bool> {
        if self.scope.is_closed() {
            return Err(StoreError::TransactionClosed);
        }
        self.txn.contains(pattern)
    }

    /// Quads matching `pattern` as a pipeline stream
    pub fn stream(&self, pattern: &Pattern) -> QuadStream<'_> {
        Box::new(self.quads_matching(pattern).map(|r| r.map_err(Into::into)))
    }

    /// Objects of every `rdf:type` statement about `node`, deduplicated
    pub fn types_of(&self, node: &Term) -> StoreResult<Vec<Term>> {
        if node.is_literal() {
            return Ok(Vec::new());
        }
        let pattern = Pattern::any()
            .subject(node.clone())
            .predicate(Term::iri(vocab::rdf::TYPE));

        let mut types: Vec<Term> = Vec::new();
        for quad in self.quads_matching(&pattern) {
            let object = quad?.object;
            if !types.contains(&object) {
                types.push(object);
            }
        }
        Ok(types)
    }
}

impl fmt::Debug for ReadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadHandle")
            .field("closed", &self.scope.is_closed())
            .finish()
    }
}

/// Per-request bundle threaded through every field resolution
#[derive(Clone)]
pub struct ExecutionContext {
    request_id: Uuid,
    dataset: Arc<dyn GraphStore>,
    credential: Option<CredentialToken>,
    search: Option<Arc<dyn SearchClient>>,
    scope: Arc<TransactionScope>,
}

impl ExecutionContext {
    pub fn new(dataset: Arc<dyn GraphStore>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            dataset,
            credential: None,
            search: None,
            scope: Arc::new(TransactionScope::new()),
        }
    }

    pub fn with_credential(mut self, credential: Option<CredentialToken>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_search(mut self, search: Option<Arc<dyn SearchClient>>) -> Self {
        self.search = search;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn dataset(&self) -> &Arc<dyn GraphStore> {
        &self.dataset
    }

    pub fn credential(&self) -> Option<&CredentialToken> {
        self.credential.as_ref()
    }

    pub fn search(&self) -> Option<&Arc<dyn SearchClient>> {
        self.search.as_ref()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.scope.state()
    }

    /// Run `f` inside the request's read transaction.
    ///
    /// Opens the transaction if none is active, otherwise reuses it. The
    /// scope is left when the returned future completes or is dropped;
    /// errors from `f` propagate unchanged.
    pub async fn with_read_transaction<T, F, Fut>(&self, f: F) -> QueryResult<T>
    where
        F: FnOnce(ReadHandle) -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        let (handle, _guard) = self.scope.enter(self.dataset.as_ref())?;
        f(handle).await
    }

    /// Synchronous form of [`Self::with_read_transaction`]
    pub fn read<T, F>(&self, f: F) -> QueryResult<T>
    where
        F: FnOnce(&ReadHandle) -> QueryResult<T>,
    {
        let (handle, _guard) = self.scope.enter(self.dataset.as_ref())?;
        f(&handle)
    }

    /// Keep the scope open for the whole of `fut`.
    ///
    /// Every read inside `fut` shares one transaction; the scope closes
    /// when `fut` finishes.
    pub async fn run_request<T, Fut>(&self, fut: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        let _pin = self.scope.pin();
        fut.await
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("request_id", &self.request_id)
            .field("store", &self.dataset.name())
            .field("credential", &self.credential)
            .field("search", &self.search.is_some())
            .field("transaction", &self.scope.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use trove_core::{MemoryQuadStore, Quad};

    fn store() -> Arc<MemoryQuadStore> {
        Arc::new(MemoryQuadStore::with_quads(vec![Quad::new(
            Term::iri("http://ex.org/s"),
            Term::iri("http://ex.org/p"),
            Term::iri("http://ex.org/o"),
        )]))
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let token = CredentialToken::new("s3cret");
        assert_eq!(format!("{:?}", token), "CredentialToken(<redacted>)");
        assert_eq!(token.expose(), "s3cret");
    }

    #[tokio::test]
    async fn test_state_machine() {
        let store = store();
        let ctx = ExecutionContext::new(store.clone());
        assert_eq!(ctx.transaction_state(), TransactionState::NotStarted);

        let seen = ctx
            .with_read_transaction(|txn| async move {
                Ok(txn.quads_matching(&Pattern::any()).count())
            })
            .await
            .unwrap();
        assert_eq!(seen, 1);
        assert_eq!(ctx.transaction_state(), TransactionState::Closed);

        let err = ctx
            .with_read_transaction(|_| async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Store(StoreError::TransactionClosed)));
    }

    #[tokio::test]
    async fn test_nested_calls_reuse_transaction() {
        let store = store();
        let ctx = ExecutionContext::new(store.clone());

        let inner_state = ctx
            .with_read_transaction(|_outer| {
                let ctx = ctx.clone();
                async move {
                    ctx.with_read_transaction(|_inner| async { Ok(()) }).await?;
                    ctx.read(|_| Ok(()))?;
                    Ok::<_, QueryError>(ctx.transaction_state())
                }
            })
            .await
            .unwrap();

        assert_eq!(inner_state, TransactionState::Active);
        assert_eq!(store.transactions_opened(), 1);
        assert_eq!(ctx.transaction_state(), TransactionState::Closed);
    }

    #[tokio::test]
    async fn test_error_closes_scope_and_propagates() {
        let ctx = ExecutionContext::new(store());

        let err = ctx
            .with_read_transaction(|_| async {
                Err::<(), _>(QueryError::invalid_argument("x", "boom"))
            })
            .await
            .unwrap_err();

        assert!(err.is_invalid_argument());
        assert_eq!(ctx.transaction_state(), TransactionState::Closed);
    }

    #[test]
    fn test_handle_fails_after_close() {
        let ctx = ExecutionContext::new(store());
        let leaked = ctx.read(|txn| Ok(txn.clone())).unwrap();

        assert_eq!(ctx.transaction_state(), TransactionState::Closed);
        let first = leaked.quads_matching(&Pattern::any()).next();
        assert!(matches!(first, Some(Err(StoreError::TransactionClosed))));
        assert!(leaked.contains(&Pattern::any()).is_err());
    }

    #[tokio::test]
    async fn test_run_request_keeps_siblings_in_one_transaction() {
        let store = store();
        let ctx = ExecutionContext::new(store.clone());

        ctx.run_request(async {
            assert_eq!(ctx.transaction_state(), TransactionState::NotStarted);
            ctx.read(|_| Ok(())).unwrap();
            assert_eq!(ctx.transaction_state(), TransactionState::Active);
            ctx.read(|_| Ok(())).unwrap();
        })
        .await;

        assert_eq!(store.transactions_opened(), 1);
        assert_eq!(ctx.transaction_state(), TransactionState::Closed);
    }

    #[test]
    fn test_store_failure_surfaces_through_read() {
        let store = store();
        store.fail_reads_with(Some(StoreError::unavailable("maintenance")));
        let ctx = ExecutionContext::new(store.clone());

        // the memory store reports injected failures lazily, per read
        let result = ctx.read(|txn| {
            txn.quads_matching(&Pattern::any())
                .collect::<StoreResult<Vec<_>>>()
                .map_err(QueryError::from)
        });
        assert!(matches!(
            result,
            Err(QueryError::Store(StoreError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_types_of() {
        let store = MemoryQuadStore::with_quads(vec![
            Quad::new(
                Term::iri("http://ex.org/a"),
                Term::iri(vocab::rdf::TYPE),
                Term::iri("http://ex.org/T1"),
            ),
            Quad::new(
                Term::iri("http://ex.org/a"),
                Term::iri(vocab::rdf::TYPE),
                Term::iri("http://ex.org/T2"),
            ),
        ]);
        let ctx = ExecutionContext::new(Arc::new(store));

        let types = ctx
            .read(|txn| Ok(txn.types_of(&Term::iri("http://ex.org/a"))?))
            .unwrap();
        assert_eq!(types.len(), 2);

        let none = ctx
            .read(|txn| Ok(txn.types_of(&Term::literal("a"))?))
            .unwrap_err();
        // the first read closed the scope
        assert!(matches!(none, QueryError::Store(StoreError::TransactionClosed)));
    }
}
