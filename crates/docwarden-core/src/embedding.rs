//! Text embedding used by the bundled store backends.
//!
//! Callers never supply vectors: a store embeds document text on `add` and
//! query text on `query`. The bundled [`HashEmbedder`] is a deterministic
//! feature-hashing bag of words, good enough for nearest-neighbour lookups
//! over maintenance data without a model download.

/// Produces fixed-size vectors from text
pub trait Embedder: Send + Sync {
    /// Model identifier
    fn model_name(&self) -> &str;

    /// Vector dimensionality
    fn dims(&self) -> usize;

    /// Embed one text
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Embed a batch of texts, in order
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Default dimensionality of [`HashEmbedder`]
pub const DEFAULT_HASH_DIMS: usize = 256;

/// Feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in bytes {
            hash ^= u64::from(*b);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn tokens(text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            // Scripts without spaces between words still get per-char features
            if !word.is_ascii() {
                tokens.extend(word.chars().filter(|c| !c.is_ascii()).map(String::from));
            }
            tokens.push(word);
        }
        tokens
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMS)
    }
}

impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "feature-hash"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in Self::tokens(text) {
            let hash = Self::fnv1a(token.as_bytes());
            let bucket = (hash % self.dims as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalised() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Rust ownership rules");
        let b = embedder.embed("Rust ownership rules");
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_HASH_DIMS);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_shared_words_are_closer() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("database connection error");
        let related = embedder.embed("the database connection failed with an error");
        let unrelated = embedder.embed("banana bread recipe");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        assert!(embedder.embed("").iter().all(|x| *x == 0.0));
    }
}
