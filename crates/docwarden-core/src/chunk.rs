//! Fixed-size text chunking for oversized documents.
//!
//! Lengths are counted in Unicode scalar values, so a chunk boundary never
//! falls inside a character. Chunks are contiguous and cover the input
//! exactly; only the last chunk may be shorter than `max_chars`.

/// Length of a document's text as used by the maintenance passes
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into contiguous chunks of `max_chars` characters.
///
/// Always returns at least one chunk. Short trailing chunks are kept as-is.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::with_capacity(text_len(text).div_ceil(max_chars));
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        current.push(c);
        count += 1;
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Id of the `index`-th fragment split from `source_id`
pub fn fragment_id(source_id: &str, index: usize) -> String {
    format!("{}_split{}", source_id, index)
}
