//! Core data models shared by every retrieval backend.

use serde::{Deserialize, Serialize};

/// A bounded slice of corpus text and the document it came from.
///
/// Two fragments are the same fragment exactly when both `source` and
/// `content` match. Index-local positions are never used as identity
/// because they are not comparable across backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    /// Fragment text.
    pub content: String,
    /// Identifier of the originating document (a file path for the
    /// filesystem corpus).
    pub source: String,
}

impl Fragment {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }

    /// The fusion merge key: `(source, content)`.
    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.content)
    }
}

/// A fragment returned by one backend, scored on a "higher is more
/// relevant" scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFragment {
    pub fragment: Fragment,
    pub score: f64,
}

impl ScoredFragment {
    pub fn new(fragment: Fragment, score: f64) -> Self {
        Self { fragment, score }
    }
}

/// A fragment after fusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedFragment {
    pub fragment: Fragment,
    /// Mean of the per-backend scores that were collected.
    pub score: f64,
    /// Number of backend results that contributed to `score`.
    pub hits: usize,
}
