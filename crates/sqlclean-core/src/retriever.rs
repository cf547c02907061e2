//! Uniform contract for retrieval backends.
//!
//! Every index the hybrid retriever fans out to implements [`Retriever`].
//! New backends are added by implementing the trait, not by teaching the
//! hybrid retriever about them.
//!
//! # Score contract
//!
//! `query` results are scored "higher is more relevant", roughly on
//! `[0, 1]`. A backend whose search structure reports distances converts
//! them before returning. Fusion never rescales.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Fragment, ScoredFragment};

/// A retrieval backend over a corpus of [`Fragment`]s.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`name`](Retriever::name) | Stable label for logs and stats |
/// | [`build`](Retriever::build) | Index a corpus, replacing prior state |
/// | [`query`](Retriever::query) | Return at most `k` scored fragments |
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Short backend label (e.g. `"lexical"`).
    fn name(&self) -> &'static str;

    /// Index `fragments`, discarding any previous state.
    ///
    /// An empty slice leaves the backend empty; it is not an error.
    async fn build(&mut self, fragments: &[Fragment]) -> Result<()>;

    /// Return up to `k` fragments for `text`, best first.
    ///
    /// An empty backend returns an empty list.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredFragment>>;
}
