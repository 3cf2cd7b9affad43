//! Distance and similarity scoring.
//!
//! Stores report a distance (lower is closer). Anything surfaced to a
//! caller as a similarity goes through [`distance_to_similarity`], which
//! stays in `(0, 1]` for every non-negative distance. `1 - distance` is
//! not used because it turns negative once distances exceed 1.

use serde::{Deserialize, Serialize};

/// Convert a distance into a similarity score in `(0, 1]`
pub fn distance_to_similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

/// Cosine similarity between two vectors (0 for empty or mismatched input)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance `1 - cos`, clamped to `[0, 2]`
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, 2.0)
}

/// Relevance bucket of a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
}

/// Caller-defined cut points for relevance bucketing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceBands {
    /// Scores at or above this are `High`
    pub high: f32,
    /// Scores at or above this (and below `high`) are `Medium`
    pub medium: f32,
}

impl Default for RelevanceBands {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.5,
        }
    }
}

impl RelevanceBands {
    pub fn new(high: f32, medium: f32) -> Self {
        let high = high.clamp(0.0, 1.0);
        Self {
            high,
            medium: medium.clamp(0.0, high),
        }
    }

    pub fn classify(&self, similarity: f32) -> Relevance {
        if similarity >= self.high {
            Relevance::High
        } else if similarity >= self.medium {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_is_full_similarity() {
        assert_eq!(distance_to_similarity(0.0), 1.0);
    }

    #[test]
    fn test_similarity_bounded_and_decreasing() {
        let distances = [0.0, 0.1, 0.5, 1.0, 1.5, 2.0, 10.0, 1000.0];
        let mut previous = f32::INFINITY;
        for d in distances {
            let s = distance_to_similarity(d);
            assert!(s > 0.0 && s <= 1.0, "similarity {} out of range", s);
            assert!(s < previous);
            previous = s;
        }
    }

    #[test]
    fn test_cosine() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_relevance_bands() {
        let bands = RelevanceBands::default();
        assert_eq!(bands.classify(0.9), Relevance::High);
        assert_eq!(bands.classify(0.6), Relevance::Medium);
        assert_eq!(bands.classify(0.2), Relevance::Low);

        let strict = RelevanceBands::new(0.95, 0.99);
        assert_eq!(strict.medium, 0.95);
    }
}
