//! Fixed-width text chunker.
//!
//! Splits document text into contiguous, non-overlapping pieces of at most
//! `chunk_size` characters. Boundaries are purely positional: no sentence,
//! paragraph, or SQL statement awareness. A statement that straddles a
//! boundary lands in two fragments.
//!
//! Sizes are counted in `char`s, so a multi-byte code point is never split.
//!
//! # Example
//!
//! ```rust
//! use sqlclean_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("abcdefg", 3);
//! assert_eq!(chunks, vec!["abc", "def", "g"]);
//! ```

use crate::models::Fragment;

/// Split `text` into pieces of at most `chunk_size` characters.
///
/// # Guarantees
///
/// - Empty text yields no chunks.
/// - Concatenating the chunks reproduces `text` exactly.
/// - Every chunk but the last has exactly `chunk_size` characters.
/// - A `chunk_size` of zero disables splitting (one chunk for non-empty text).
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if chunk_size == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(text[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }
    chunks.push(text[start..].to_string());

    chunks
}

/// Chunk one document into [`Fragment`]s tagged with `source`.
pub fn chunk_document(source: &str, text: &str, chunk_size: usize) -> Vec<Fragment> {
    chunk_text(text, chunk_size)
        .into_iter()
        .map(|content| Fragment::new(content, source))
        .collect()
}
