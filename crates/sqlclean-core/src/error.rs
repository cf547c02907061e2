//! Error types for retrieval operations.

use thiserror::Error;

/// Errors raised by the indices and the hybrid retriever.
///
/// Backends report most failures as `anyhow::Error`; these variants are
/// the ones callers are expected to match on.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Every backend failed, so no ranking could be produced.
    ///
    /// Distinct from `Ok(vec![])`, which means nothing was relevant.
    #[error("all {count} retrieval backends failed: {details}")]
    AllBackendsFailed { count: usize, details: String },

    /// A vector did not have the dimensionality the index was built with.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A record id was added to a collection twice.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// Parallel input slices had different lengths.
    #[error("length mismatch: {ids} ids, {documents} documents, {embeddings} embeddings")]
    LengthMismatch {
        ids: usize,
        documents: usize,
        embeddings: usize,
    },
}
