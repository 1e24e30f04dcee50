//! Unit of work and the in-memory copy-on-commit store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::repository::StorageError;

/// Why a commit did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The unit of work was already committed (or a commit was attempted).
    #[error("Unit of work already committed")]
    AlreadyCommitted,

    /// The staged mutation at `index` (1-based) failed; nothing was applied.
    #[error("Staged mutation {index} failed: {source}")]
    Mutation {
        index: usize,
        #[source]
        source: StorageError,
    },

    /// The storage refused the commit as a whole.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Commit boundary for the staged mutations of one operation.
///
/// All staged mutations become durable or none do. A unit of work commits at
/// most once; a second call fails without touching storage.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn commit(&mut self) -> Result<(), CommitError>;

    /// Number of staged, not yet committed mutations.
    fn pending(&self) -> usize;
}

type Mutation<S> = Box<dyn FnOnce(&mut S) -> Result<(), StorageError> + Send + Sync>;

/// Shared in-memory state with atomic, copy-on-commit sessions.
///
/// Clones share the same state.
pub struct MemoryStore<S> {
    state: Arc<RwLock<S>>,
    commits: Arc<AtomicU64>,
    fail_on: Arc<AtomicUsize>,
}

impl<S> Clone for MemoryStore<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            commits: Arc::clone(&self.commits),
            fail_on: Arc::clone(&self.fail_on),
        }
    }
}

impl<S: Default> Default for MemoryStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> MemoryStore<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            commits: Arc::new(AtomicU64::new(0)),
            fail_on: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Opens a new session on this store.
    pub fn session(&self) -> MemorySession<S> {
        MemorySession {
            store: self.clone(),
            staged: Vec::new(),
            committed: false,
        }
    }

    /// Reads committed state.
    pub async fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Makes the `n`th staged mutation (1-based) of the next commit fail.
    pub fn fail_on_mutation(&self, n: usize) {
        self.fail_on.store(n, Ordering::SeqCst);
    }
}

/// Operation-scoped session over a [`MemoryStore`].
///
/// Reads go to committed state; `stage` queues a mutation that runs on a
/// private copy at commit time. The copy replaces the shared state only if
/// every mutation succeeds.
pub struct MemorySession<S> {
    store: MemoryStore<S>,
    staged: Vec<Mutation<S>>,
    committed: bool,
}

impl<S> MemorySession<S> {
    /// Queues a mutation for the next commit.
    pub fn stage<F>(&mut self, mutation: F)
    where
        F: FnOnce(&mut S) -> Result<(), StorageError> + Send + Sync + 'static,
    {
        self.staged.push(Box::new(mutation));
    }

    /// Reads committed state.
    pub async fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.store.read(f).await
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

#[async_trait]
impl<S> UnitOfWork for MemorySession<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn commit(&mut self) -> Result<(), CommitError> {
        if self.committed {
            return Err(CommitError::AlreadyCommitted);
        }
        self.committed = true;

        let fail_on = self.store.fail_on.swap(0, Ordering::SeqCst);
        let mut state = self.store.state.write().await;
        let mut draft = state.clone();

        for (i, mutation) in self.staged.drain(..).enumerate() {
            let index = i + 1;
            if index == fail_on {
                return Err(CommitError::Mutation {
                    index,
                    source: StorageError::Injected,
                });
            }
            mutation(&mut draft).map_err(|source| CommitError::Mutation { index, source })?;
        }

        *state = draft;
        self.store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }
}
