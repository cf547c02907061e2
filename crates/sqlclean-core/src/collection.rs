//! Id-addressed in-memory vector collection (semantic index A).
//!
//! [`Collection`] stores `{id, document, embedding}` records and answers
//! nearest-neighbour queries with *distances* in a configurable
//! [`Space`]. [`CollectionIndex`] wraps it as a [`Retriever`]: fragment
//! `i` is stored under id `"i"`, and distances are turned into
//! similarities as `1 - distance` before results leave the backend.
//!
//! Search is brute force over every record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embedding::{cosine_similarity, dot_product, embed_checked, l2_squared, Embedder};
use crate::error::RetrievalError;
use crate::models::{Fragment, ScoredFragment};
use crate::retriever::Retriever;

/// Distance function used by a [`Collection`].
///
/// `L2` matches the squared-Euclidean default of common embedding stores,
/// and with it `1 - distance` can go negative for distant vectors.
/// `Cosine` is the default here so converted scores stay within `0..=1`
/// for non-negative similarities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    /// `1 - cos(a, b)`.
    #[default]
    Cosine,
    /// Squared Euclidean distance.
    L2,
    /// `1 - a · b`.
    Ip,
}

impl Space {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Space::Cosine => 1.0 - cosine_similarity(a, b),
            Space::L2 => l2_squared(a, b),
            Space::Ip => 1.0 - dot_product(a, b),
        }
    }
}

impl std::str::FromStr for Space {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(Space::Cosine),
            "l2" => Ok(Space::L2),
            "ip" => Ok(Space::Ip),
            other => anyhow::bail!("Unknown collection space: '{}'. Use cosine, l2, or ip.", other),
        }
    }
}

struct Record {
    id: String,
    document: String,
    embedding: Vec<f32>,
}

/// Nearest records for one query, closest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub distances: Vec<f32>,
}

/// A named set of embedded records.
pub struct Collection {
    name: String,
    space: Space,
    dims: Option<usize>,
    records: Vec<Record>,
    by_id: HashMap<String, usize>,
}

impl Collection {
    pub fn new(name: impl Into<String>, space: Space) -> Self {
        Self {
            name: name.into(),
            space,
            dims: None,
            records: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Add records. The batch is validated in full before anything is
    /// stored, so a rejected batch leaves the collection unchanged.
    pub fn add(
        &mut self,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<(), RetrievalError> {
        if ids.len() != documents.len() || ids.len() != embeddings.len() {
            return Err(RetrievalError::LengthMismatch {
                ids: ids.len(),
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }

        let expected = self
            .dims
            .or_else(|| embeddings.first().map(|e| e.len()));
        if let Some(expected) = expected {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(RetrievalError::DimensionMismatch {
                    expected,
                    got: bad.len(),
                });
            }
        }

        {
            let mut seen = HashSet::new();
            for id in &ids {
                if self.by_id.contains_key(id) || !seen.insert(id.as_str()) {
                    return Err(RetrievalError::DuplicateId(id.clone()));
                }
            }
        }

        self.dims = expected;
        for ((id, document), embedding) in ids.into_iter().zip(documents).zip(embeddings) {
            self.by_id.insert(id.clone(), self.records.len());
            self.records.push(Record {
                id,
                document,
                embedding,
            });
        }
        Ok(())
    }

    /// Return the `n_results` records closest to `embedding`, ascending by
    /// distance. Equal distances keep insertion order.
    pub fn query(&self, embedding: &[f32], n_results: usize) -> Result<QueryResult, RetrievalError> {
        if let Some(dims) = self.dims {
            if embedding.len() != dims {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dims,
                    got: embedding.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, self.space.distance(embedding, &r.embedding)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n_results);

        let mut result = QueryResult::default();
        for (i, distance) in scored {
            let record = &self.records[i];
            result.ids.push(record.id.clone());
            result.documents.push(record.document.clone());
            result.distances.push(distance);
        }
        Ok(result)
    }
}

/// Semantic retriever backed by a [`Collection`].
pub struct CollectionIndex {
    embedder: Arc<dyn Embedder>,
    collection: Collection,
    fragments: HashMap<String, Fragment>,
}

impl CollectionIndex {
    pub fn new(embedder: Arc<dyn Embedder>, space: Space) -> Self {
        Self {
            embedder,
            collection: Collection::new("sql_docs", space),
            fragments: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.collection.count()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.count() == 0
    }
}

#[async_trait]
impl Retriever for CollectionIndex {
    fn name(&self) -> &'static str {
        "collection"
    }

    async fn build(&mut self, fragments: &[Fragment]) -> Result<()> {
        let space = self.collection.space();
        self.collection = Collection::new("sql_docs", space);
        self.fragments.clear();
        if fragments.is_empty() {
            return Ok(());
        }

        let documents: Vec<String> = fragments.iter().map(|f| f.content.clone()).collect();
        let embeddings = embed_checked(self.embedder.as_ref(), &documents).await?;
        let ids: Vec<String> = (0..fragments.len()).map(|i| i.to_string()).collect();

        self.collection.add(ids.clone(), documents, embeddings)?;
        self.fragments = ids.into_iter().zip(fragments.iter().cloned()).collect();
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredFragment>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = embed_checked(self.embedder.as_ref(), &[text.to_string()]).await?;
        let result = self.collection.query(&query_vec[0], k)?;

        Ok(result
            .ids
            .iter()
            .zip(result.distances.iter())
            .filter_map(|(id, distance)| {
                self.fragments
                    .get(id)
                    .map(|f| ScoredFragment::new(f.clone(), 1.0 - *distance as f64))
            })
            .collect())
    }
}
