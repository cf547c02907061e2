//! Retrieval strategies.
//!
//! A [`RetrievalMode`] decides which backends an index run builds. The mode
//! only produces [`Retriever`] trait objects; the hybrid retriever never
//! looks at the mode itself.
//!
//! | Mode | Backends | Needs embeddings |
//! |------|----------|------------------|
//! | `simple` | lexical | No |
//! | `hybrid` | lexical, collection, flat | Yes |

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use sqlclean_core::collection::{CollectionIndex, Space};
use sqlclean_core::embedding::Embedder;
use sqlclean_core::flat::FlatIndex;
use sqlclean_core::lexical::LexicalIndex;
use sqlclean_core::Retriever;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// TF-IDF only.
    Simple,
    /// TF-IDF plus both vector indices.
    #[default]
    Hybrid,
}

/// Human-readable description of a mode, for `sqlclean strategies`.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub components: Vec<&'static str>,
    pub use_case: &'static str,
    pub pros: Vec<&'static str>,
    pub cons: Vec<&'static str>,
}

impl RetrievalMode {
    pub const ALL: [RetrievalMode; 2] = [RetrievalMode::Simple, RetrievalMode::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn needs_embeddings(&self) -> bool {
        matches!(self, Self::Hybrid)
    }

    /// Build a fresh, unindexed backend set for this mode.
    ///
    /// `embedder` must be present for modes that need embeddings.
    pub fn retrievers(
        &self,
        embedder: Option<&Arc<dyn Embedder>>,
        space: Space,
    ) -> Result<Vec<Box<dyn Retriever>>> {
        let mut backends: Vec<Box<dyn Retriever>> = vec![Box::new(LexicalIndex::new())];
        if self.needs_embeddings() {
            let embedder = match embedder {
                Some(e) => e,
                None => bail!("Mode '{}' requires an embedding provider", self),
            };
            backends.push(Box::new(CollectionIndex::new(Arc::clone(embedder), space)));
            backends.push(Box::new(FlatIndex::new(Arc::clone(embedder))));
        }
        Ok(backends)
    }

    pub fn info(&self) -> StrategyInfo {
        match self {
            Self::Simple => StrategyInfo {
                name: "Simple TF-IDF",
                components: vec!["TF-IDF lexical index"],
                use_case: "Keyword-based retrieval, lightweight and fast",
                pros: vec!["Fast", "Lightweight", "Works offline"],
                cons: vec!["Keyword-only", "No semantic understanding"],
            },
            Self::Hybrid => StrategyInfo {
                name: "Hybrid multi-index",
                components: vec![
                    "TF-IDF lexical index (keyword matching)",
                    "Vector collection (semantic, distance-based)",
                    "Flat inner-product index (semantic, exact search)",
                ],
                use_case: "Keywords and semantics combined by score fusion",
                pros: vec![
                    "Combines keyword and semantic search",
                    "Handles synonyms well",
                    "Fragments found by several indices rank higher",
                ],
                cons: vec![
                    "Higher memory usage",
                    "Slower indexing",
                    "Needs an embedding provider",
                ],
            },
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RetrievalMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(Self::Simple),
            "hybrid" => Ok(Self::Hybrid),
            other => bail!("Unknown retrieval mode: {}. Use simple or hybrid.", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    #[test]
    fn test_simple_is_lexical_only() {
        let backends = RetrievalMode::Simple.retrievers(None, Space::Cosine).unwrap();
        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["lexical"]);
    }

    #[test]
    fn test_hybrid_builds_three_backends() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(64));
        let backends = RetrievalMode::Hybrid
            .retrievers(Some(&embedder), Space::Cosine)
            .unwrap();
        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["lexical", "collection", "flat"]);
    }

    #[test]
    fn test_hybrid_without_embedder_fails() {
        assert!(RetrievalMode::Hybrid.retrievers(None, Space::Cosine).is_err());
    }

    #[test]
    fn test_parse_and_info() {
        assert_eq!("simple".parse::<RetrievalMode>().unwrap(), RetrievalMode::Simple);
        assert!("fancy".parse::<RetrievalMode>().is_err());
        assert_eq!(RetrievalMode::Hybrid.info().components.len(), 3);
    }
}
