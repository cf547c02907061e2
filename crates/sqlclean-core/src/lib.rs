//! # SQL Clean Core
//!
//! Runtime-free retrieval logic for SQL Clean: the fragment model,
//! fixed-width chunking, the lexical and vector indices, score fusion, and
//! the hybrid retriever that ties them together.
//!
//! This crate contains no tokio, filesystem I/O, or network clients.
//! Embeddings arrive through the [`embedding::Embedder`] trait and corpus
//! text arrives as already-read [`models::Fragment`]s; the `sqlclean` app
//! crate supplies both.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Fragment`, `ScoredFragment`, `FusedFragment` |
//! | [`chunk`] | Character-offset chunker |
//! | [`embedding`] | `Embedder` trait and vector helpers |
//! | [`retriever`] | Uniform `build`/`query` contract for backends |
//! | [`lexical`] | TF-IDF index with a fixed relevance floor |
//! | [`collection`] | Id-addressed vector collection reporting distances |
//! | [`flat`] | Exact inner-product index with sentinel slots |
//! | [`fusion`] | Mean-score fusion over (source, content) keys |
//! | [`hybrid`] | Snapshot-swapping retriever over many backends |
//! | [`error`] | Typed retrieval errors |

pub mod chunk;
pub mod collection;
pub mod embedding;
pub mod error;
pub mod flat;
pub mod fusion;
pub mod hybrid;
pub mod lexical;
pub mod models;
pub mod retriever;

pub use error::RetrievalError;
pub use hybrid::HybridRetriever;
pub use models::{Fragment, FusedFragment, ScoredFragment};
pub use retriever::Retriever;
