//! Embedding trait and vector utilities.
//!
//! Defines the [`Embedder`] trait both semantic indices encode through,
//! plus pure helpers for similarity and distance computation.
//!
//! Concrete embedders (hashing, OpenAI, Ollama, fastembed) live in the
//! `sqlclean` app crate. Any implementation is substitutable as long as
//! build-time and query-time vectors agree on [`Embedder::dims`].

use anyhow::{bail, Result};
use async_trait::async_trait;

/// Trait for embedding functions.
///
/// `embed` maps a batch of texts to one fixed-dimension vector per text,
/// in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"bge-large-en-v1.5"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `1024`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed `texts` and check that one vector came back per input and that
/// every vector has [`Embedder::dims`] components.
pub async fn embed_checked(embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let vectors = embedder.embed(texts).await?;
    if vectors.len() != texts.len() {
        bail!(
            "Embedder '{}' returned {} vectors for {} texts",
            embedder.model_name(),
            vectors.len(),
            texts.len()
        );
    }
    let dims = embedder.dims();
    if let Some(v) = vectors.iter().find(|v| v.len() != dims) {
        return Err(crate::RetrievalError::DimensionMismatch {
            expected: dims,
            got: v.len(),
        }
        .into());
    }
    Ok(vectors)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`, or `0.0` for empty vectors, vectors of
/// different lengths, and zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Inner product of two equal-length vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
