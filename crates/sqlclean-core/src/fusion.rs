//! Mean-score fusion of per-backend rankings.
//!
//! # Algorithm
//!
//! 1. Flatten every backend's results, in backend order, into one list.
//! 2. Group by the fragment key `(source, content)`. Each backend that
//!    returned a fragment adds one score to its group; a backend that did
//!    not return it adds nothing (no zero fill).
//! 3. Fused score = arithmetic mean of the group's scores.
//! 4. Stable sort descending by fused score, so ties keep the order in
//!    which groups were first seen while flattening.
//! 5. Truncate to `k`.
//!
//! Inputs must already be on a "higher is better" scale; see
//! [`Retriever`](crate::retriever::Retriever). Nothing is rescaled here.

use std::collections::HashMap;

use crate::models::{Fragment, FusedFragment, ScoredFragment};

/// Fuse backend result lists into the top `k` fragments with their fused
/// scores.
pub fn fuse_scored(per_backend: &[Vec<ScoredFragment>], k: usize) -> Vec<FusedFragment> {
    struct Group<'a> {
        fragment: &'a Fragment,
        sum: f64,
        hits: usize,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut by_key: HashMap<(&str, &str), usize> = HashMap::new();

    for scored in per_backend.iter().flatten() {
        let idx = *by_key.entry(scored.fragment.key()).or_insert_with(|| {
            groups.push(Group {
                fragment: &scored.fragment,
                sum: 0.0,
                hits: 0,
            });
            groups.len() - 1
        });
        groups[idx].sum += scored.score;
        groups[idx].hits += 1;
    }

    let mut fused: Vec<FusedFragment> = groups
        .into_iter()
        .map(|g| FusedFragment {
            fragment: g.fragment.clone(),
            score: g.sum / g.hits as f64,
            hits: g.hits,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(k);
    fused
}

/// Fuse backend result lists into the top `k` fragments.
///
/// Per-backend scores are not exposed; use [`fuse_scored`] for diagnostics.
pub fn fuse(per_backend: &[Vec<ScoredFragment>], k: usize) -> Vec<Fragment> {
    fuse_scored(per_backend, k)
        .into_iter()
        .map(|f| f.fragment)
        .collect()
}
