//! Hybrid retriever: one corpus, many backends, one fused ranking.
//!
//! [`HybridRetriever`] owns a snapshot of `{corpus, backends}`. Indexing
//! builds a brand-new snapshot from freshly constructed backends and swaps
//! it in under a write lock in one step, so a retrieval never pairs a
//! corpus with a backend built from a different one. Retrievals clone the
//! current snapshot handle and release the lock before any backend work.
//!
//! # Failure policy
//!
//! - A backend that fails to build is logged and left out of the snapshot.
//! - A backend that fails a query is logged and left out of that fusion.
//! - If every backend fails, the call returns
//!   [`RetrievalError::AllBackendsFailed`]; a failed index keeps the
//!   previous snapshot.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::RetrievalError;
use crate::fusion::fuse_scored;
use crate::models::{Fragment, FusedFragment, ScoredFragment};
use crate::retriever::Retriever;

/// Produces a fresh, empty set of backends for each index run.
pub type RetrieverFactory = dyn Fn() -> Vec<Box<dyn Retriever>> + Send + Sync;

struct Snapshot {
    corpus: Vec<Fragment>,
    backends: Vec<Box<dyn Retriever>>,
}

/// Outcome of one [`HybridRetriever::index`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub fragments: usize,
    /// Backends that built successfully and will be queried.
    pub backends: Vec<String>,
    /// Backends dropped because their build failed.
    pub failed: Vec<String>,
}

/// Fan-out retriever over independently built backends.
pub struct HybridRetriever {
    factory: Box<RetrieverFactory>,
    state: RwLock<Arc<Snapshot>>,
}

impl HybridRetriever {
    /// Create a retriever with an empty corpus. `factory` is called once
    /// per [`index`](Self::index) to obtain unbuilt backends.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Vec<Box<dyn Retriever>> + Send + Sync + 'static,
    {
        let backends = factory();
        Self {
            factory: Box::new(factory),
            state: RwLock::new(Arc::new(Snapshot {
                corpus: Vec::new(),
                backends,
            })),
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        match self.state.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Number of fragments in the current corpus.
    pub fn corpus_len(&self) -> usize {
        self.snapshot().corpus.len()
    }

    /// A copy of the current corpus, in index order.
    pub fn corpus(&self) -> Vec<Fragment> {
        self.snapshot().corpus.clone()
    }

    /// Names of the backends in the current snapshot.
    pub fn backend_names(&self) -> Vec<String> {
        self.snapshot()
            .backends
            .iter()
            .map(|b| b.name().to_string())
            .collect()
    }

    /// Replace the corpus and rebuild every backend over it.
    pub async fn index(&self, corpus: Vec<Fragment>) -> Result<IndexReport, RetrievalError> {
        let mut report = IndexReport {
            fragments: corpus.len(),
            ..Default::default()
        };

        let fresh = (self.factory)();
        let mut backends = Vec::with_capacity(fresh.len());
        let mut errors = Vec::new();

        if corpus.is_empty() {
            backends = fresh;
        } else {
            for mut backend in fresh {
                match backend.build(&corpus).await {
                    Ok(()) => backends.push(backend),
                    Err(e) => {
                        warn!(backend = backend.name(), error = %e, "backend build failed; excluding it");
                        report.failed.push(backend.name().to_string());
                        errors.push(format!("{}: {:#}", backend.name(), e));
                    }
                }
            }
            if backends.is_empty() {
                return Err(RetrievalError::AllBackendsFailed {
                    count: errors.len(),
                    details: errors.join("; "),
                });
            }
        }

        report.backends = backends.iter().map(|b| b.name().to_string()).collect();
        let snapshot = Arc::new(Snapshot { corpus, backends });
        match self.state.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        Ok(report)
    }

    /// Top `k` fragments for `query` across all backends.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Fragment>, RetrievalError> {
        Ok(self
            .retrieve_scored(query, k)
            .await?
            .into_iter()
            .map(|f| f.fragment)
            .collect())
    }

    /// Like [`retrieve`](Self::retrieve), keeping fused scores.
    pub async fn retrieve_scored(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<FusedFragment>, RetrievalError> {
        let snapshot = self.snapshot();
        if snapshot.corpus.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<Vec<ScoredFragment>> = Vec::with_capacity(snapshot.backends.len());
        let mut errors = Vec::new();

        for backend in &snapshot.backends {
            match backend.query(query, k).await {
                Ok(hits) => {
                    debug!(backend = backend.name(), hits = hits.len(), "backend query");
                    results.push(hits);
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "backend query failed; excluding it from fusion");
                    errors.push(format!("{}: {:#}", backend.name(), e));
                }
            }
        }

        if results.is_empty() {
            return Err(RetrievalError::AllBackendsFailed {
                count: errors.len(),
                details: errors.join("; "),
            });
        }

        Ok(fuse_scored(&results, k))
    }
}
