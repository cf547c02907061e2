//! Filesystem corpus source.
//!
//! Walks a repository root, keeps files matching the include globs and not
//! matching the excludes, and reads each as UTF-8. Unreadable files are
//! logged and reported as skipped rather than failing the scan.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CorpusConfig;

/// A file read from the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path of the file as displayed, used as the fragment source.
    pub source: String,
    pub content: String,
}

/// A file that matched the globs but could not be read.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct CorpusScan {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<SkippedFile>,
}

pub fn scan_corpus(root: &Path, config: &CorpusConfig) -> Result<CorpusScan> {
    let mut scan = CorpusScan::default();

    if !root.exists() {
        tracing::warn!(root = %root.display(), "corpus root does not exist, indexing nothing");
        return Ok(scan);
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                tracing::warn!(path = %path.display(), error = %e, "skipping unwalkable entry");
                scan.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => scan.documents.push(SourceDocument {
                source: path.display().to_string(),
                content,
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                scan.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    // Sort for deterministic ordering
    scan.documents.sort_by(|a, b| a.source.cmp(&b.source));

    Ok(scan)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
