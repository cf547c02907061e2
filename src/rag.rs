//! Repository-context retrieval facade.
//!
//! [`Rag`] ties the corpus scan, chunking, the configured embedding provider
//! and the [`HybridRetriever`] together. It is constructed explicitly by the
//! caller; there is no global instance.
//!
//! ```rust,no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use sqlclean::config::Config;
//! use sqlclean::rag::{render_context, Rag};
//!
//! let rag = Rag::new(&Config::default())?;
//! rag.index_directory(std::path::Path::new("./repo")).await?;
//! let fragments = rag.retrieve("SELECT * FROM orders", 5).await?;
//! println!("{}", render_context(&fragments));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use sqlclean_core::chunk::chunk_document;
use sqlclean_core::collection::Space;
use sqlclean_core::embedding::Embedder;
use sqlclean_core::{Fragment, FusedFragment, HybridRetriever};

use crate::config::{Config, CorpusConfig};
use crate::connector_fs::scan_corpus;
use crate::embedding::create_embedder;
use crate::strategy::RetrievalMode;

/// Outcome of [`Rag::index_directory`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub fragments: usize,
    /// Backends that built successfully and will answer queries.
    pub backends: Vec<String>,
}

pub struct Rag {
    corpus: CorpusConfig,
    mode: RetrievalMode,
    retriever: HybridRetriever,
}

impl Rag {
    /// Build a facade for `config.retrieval.mode`.
    ///
    /// The embedding provider is only created when the mode needs one.
    pub fn new(config: &Config) -> Result<Self> {
        let mode = config.retrieval.mode;
        let space = config.retrieval.collection_space;
        let embedder = if mode.needs_embeddings() {
            Some(create_embedder(&config.embedding)?)
        } else {
            None
        };

        // Surface a missing provider now instead of on every index run.
        mode.retrievers(embedder.as_ref(), space)?;

        let retriever = HybridRetriever::new(move || backends_for(mode, embedder.as_ref(), space));

        Ok(Self {
            corpus: config.corpus.clone(),
            mode,
            retriever,
        })
    }

    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }

    /// Scan `root`, chunk every readable document, and rebuild all backends.
    pub async fn index_directory(&self, root: &Path) -> Result<IndexStats> {
        let scan = scan_corpus(root, &self.corpus)
            .with_context(|| format!("Failed to scan corpus at {}", root.display()))?;

        let fragments: Vec<Fragment> = scan
            .documents
            .iter()
            .flat_map(|doc| chunk_document(&doc.source, &doc.content, self.corpus.chunk_size))
            .collect();

        let report = self
            .retriever
            .index(fragments)
            .await
            .context("Failed to build retrieval indices")?;

        let stats = IndexStats {
            files_indexed: scan.documents.len(),
            files_skipped: scan.skipped.len(),
            fragments: report.fragments,
            backends: report.backends,
        };
        tracing::info!(
            root = %root.display(),
            mode = %self.mode,
            files = stats.files_indexed,
            skipped = stats.files_skipped,
            fragments = stats.fragments,
            "indexed corpus"
        );
        Ok(stats)
    }

    /// Top `k` fragments for `query`. An empty corpus yields `Ok(vec![])`.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Fragment>> {
        Ok(self.retriever.retrieve(query, k).await?)
    }

    pub async fn retrieve_scored(&self, query: &str, k: usize) -> Result<Vec<FusedFragment>> {
        Ok(self.retriever.retrieve_scored(query, k).await?)
    }

    /// Backends live in the current snapshot.
    pub fn backend_names(&self) -> Vec<String> {
        self.retriever.backend_names()
    }

    /// Number of fragments currently indexed.
    pub fn fragment_count(&self) -> usize {
        self.retriever.corpus_len()
    }
}

fn backends_for(
    mode: RetrievalMode,
    embedder: Option<&Arc<dyn Embedder>>,
    space: Space,
) -> Vec<Box<dyn sqlclean_core::Retriever>> {
    match mode.retrievers(embedder, space) {
        Ok(backends) => backends,
        Err(e) => {
            tracing::warn!(error = %e, "could not construct retrieval backends");
            Vec::new()
        }
    }
}

/// Render fragments as a context block for an SQL-optimization prompt.
///
/// Returns an empty string when there is nothing to show, so callers can
/// prepend the result unconditionally.
pub fn render_context(fragments: &[Fragment]) -> String {
    if fragments.is_empty() {
        return String::new();
    }

    let mut out = String::from("Relevant repository context:\n");
    for fragment in fragments {
        out.push_str("\n--- ");
        out.push_str(&fragment.source);
        out.push_str(" ---\n");
        out.push_str(fragment.content.trim_end());
        out.push('\n');
    }
    out
}
