//! Exact inner-product vector index (semantic index B).
//!
//! [`FlatIpIndex`] keeps every vector in one row-major buffer and scores a
//! query against all of them. `search` always fills `k` slots; slots with
//! no stored vector carry the label [`NO_LABEL`] and a score of
//! `f32::NEG_INFINITY`. [`FlatIndex`] wraps it as a [`Retriever`], clamps
//! `k` to the number of stored fragments and filters any sentinel slots
//! out. Inner products are already similarities, so scores pass through
//! unchanged.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::embedding::{dot_product, embed_checked, Embedder};
use crate::error::RetrievalError;
use crate::models::{Fragment, ScoredFragment};
use crate::retriever::Retriever;

/// Label of an unfilled search slot.
pub const NO_LABEL: i64 = -1;

/// Flat inner-product index over fixed-dimension vectors.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dims: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            data: Vec::new(),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of stored vectors.
    pub fn ntotal(&self) -> usize {
        if self.dims == 0 {
            0
        } else {
            self.data.len() / self.dims
        }
    }

    /// Append vectors; they receive labels `ntotal()..`.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), RetrievalError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dims) {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dims,
                got: bad.len(),
            });
        }
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// Score `query` against every stored vector and return exactly `k`
    /// `(score, label)` slots, best first. Ties keep label order.
    ///
    /// The padding is materialized, so `k` must be bounded by the caller.
    pub fn search(&self, query: &[f32], k: usize) -> Result<(Vec<f32>, Vec<i64>), RetrievalError> {
        if query.len() != self.dims {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dims,
                got: query.len(),
            });
        }

        let mut scored: Vec<(i64, f32)> = if self.dims == 0 {
            Vec::new()
        } else {
            self.data
                .chunks_exact(self.dims)
                .enumerate()
                .map(|(i, row)| (i as i64, dot_product(query, row)))
                .collect()
        };
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        let mut scores = Vec::with_capacity(scored.len());
        let mut labels = Vec::with_capacity(scored.len());
        for (label, score) in scored {
            labels.push(label);
            scores.push(score);
        }
        while labels.len() < k {
            labels.push(NO_LABEL);
            scores.push(f32::NEG_INFINITY);
        }
        Ok((scores, labels))
    }
}

/// Semantic retriever backed by a [`FlatIpIndex`].
pub struct FlatIndex {
    embedder: Arc<dyn Embedder>,
    index: FlatIpIndex,
    fragments: Vec<Fragment>,
}

impl FlatIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        let dims = embedder.dims();
        Self {
            embedder,
            index: FlatIpIndex::new(dims),
            fragments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[async_trait]
impl Retriever for FlatIndex {
    fn name(&self) -> &'static str {
        "flat"
    }

    async fn build(&mut self, fragments: &[Fragment]) -> Result<()> {
        self.index = FlatIpIndex::new(self.embedder.dims());
        self.fragments.clear();
        if fragments.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.content.clone()).collect();
        let vectors = embed_checked(self.embedder.as_ref(), &texts).await?;
        self.index.add(&vectors)?;
        self.fragments = fragments.to_vec();
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredFragment>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = embed_checked(self.embedder.as_ref(), &[text.to_string()]).await?;
        let (scores, labels) = self
            .index
            .search(&query_vec[0], k.min(self.fragments.len()))?;

        Ok(labels
            .iter()
            .zip(scores.iter())
            .filter(|(label, _)| **label != NO_LABEL)
            .filter_map(|(label, score)| {
                usize::try_from(*label)
                    .ok()
                    .and_then(|i| self.fragments.get(i))
                    .map(|f| ScoredFragment::new(f.clone(), *score as f64))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maps known texts to fixed vectors; anything else embeds to zeros.
    struct TableEmbedder {
        table: Vec<(&'static str, Vec<f32>)>,
    }

    #[async_trait]
    impl Embedder for TableEmbedder {
        fn model_name(&self) -> &str {
            "table"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    self.table
                        .iter()
                        .find(|(key, _)| key == t)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_else(|| vec![0.0, 0.0])
                })
                .collect())
        }
    }

    fn flat_index() -> FlatIndex {
        FlatIndex::new(Arc::new(TableEmbedder {
            table: vec![
                ("north", vec![2.0, 0.0]),
                ("east", vec![0.0, 1.0]),
                ("diagonal", vec![0.5, 0.5]),
                ("q", vec![1.0, 0.0]),
            ],
        }))
    }

    fn fragments(texts: &[&str]) -> Vec<Fragment> {
        texts.iter().map(|t| Fragment::new(*t, "a.sql")).collect()
    }

    #[test]
    fn test_search_pads_with_sentinels() {
        let mut index = FlatIpIndex::new(2);
        index.add(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let (scores, labels) = index.search(&[1.0, 0.0], 4).unwrap();
        assert_eq!(labels, vec![0, 1, NO_LABEL, NO_LABEL]);
        assert_eq!(scores[0], 1.0);
        assert_eq!(scores[3], f32::NEG_INFINITY);
    }

    #[test]
    fn test_search_ranks_by_inner_product() {
        let mut index = FlatIpIndex::new(2);
        index
            .add(&[vec![0.1, 0.0], vec![2.0, 0.0], vec![1.0, 1.0]])
            .unwrap();
        let (scores, labels) = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(labels, vec![1, 2]);
        assert_eq!(scores, vec![2.0, 1.0]);
    }

    #[test]
    fn test_empty_index_all_sentinels() {
        let index = FlatIpIndex::new(3);
        let (_, labels) = index.search(&[0.0, 0.0, 1.0], 2).unwrap();
        assert_eq!(labels, vec![NO_LABEL, NO_LABEL]);
        assert_eq!(index.ntotal(), 0);
    }

    #[test]
    fn test_dimension_checks() {
        let mut index = FlatIpIndex::new(2);
        assert!(matches!(
            index.add(&[vec![1.0, 2.0, 3.0]]),
            Err(RetrievalError::DimensionMismatch { expected: 2, got: 3 })
        ));
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[tokio::test]
    async fn test_query_before_build_is_empty() {
        let index = flat_index();
        assert!(index.query("q", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_passes_inner_products_through() {
        let mut index = flat_index();
        index
            .build(&fragments(&["east", "north", "diagonal"]))
            .await
            .unwrap();

        let results = index.query("q", 2).await.unwrap();
        let got: Vec<(&str, f64)> = results
            .iter()
            .map(|r| (r.fragment.content.as_str(), r.score))
            .collect();
        assert_eq!(got, vec![("north", 2.0), ("diagonal", 0.5)]);
    }

    #[tokio::test]
    async fn test_query_with_k_beyond_len_drops_empty_slots() {
        let mut index = flat_index();
        index.build(&fragments(&["north", "east"])).await.unwrap();

        let results = index.query("q", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].fragment.content, "north");
        assert_eq!(results[1].score, 0.0);

        let results = index.query("q", usize::MAX).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
