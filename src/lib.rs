//! # sqlclean
//!
//! Repository-context retrieval for SQL cleanup and optimization.
//!
//! `sqlclean` indexes the `.md` and `.sql` files of a repository and, given
//! a query (typically the SQL being optimized), returns the most relevant
//! fragments so they can be prepended to an optimizer prompt.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────────────┐
//! │ Corpus scan │──▶│    Chunk    │──▶│  HybridRetriever     │
//! │ walkdir+glob│   │  500 chars  │   │ lexical│coll.│flat   │
//! └─────────────┘   └─────────────┘   └──────────┬───────────┘
//!                                                │ fuse (mean)
//!                                                ▼
//!                                     ┌──────────────────────┐
//!                                     │ CLI / render_context │
//!                                     └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sqlclean index ./repo
//! sqlclean search "SELECT * FROM orders" --repo ./repo --format prompt
//! sqlclean strategies
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`connector_fs`] | Filesystem corpus scan |
//! | [`embedding`] | Embedding providers |
//! | [`strategy`] | Retrieval modes and their backends |
//! | [`rag`] | Indexing and retrieval facade |
//! | [`search`] | CLI command implementations |
//!
//! Retrieval primitives (chunking, the three backends, fusion) live in the
//! [`sqlclean_core`] crate and are re-exported as [`core`].

pub mod config;
pub mod connector_fs;
pub mod embedding;
pub mod logging;
pub mod rag;
pub mod search;
pub mod strategy;

pub use sqlclean_core as core;
pub use sqlclean_core::{Fragment, FusedFragment, RetrievalError};
