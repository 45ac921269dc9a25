// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge entries, retrieval results, and vector similarity.

use serde::{Deserialize, Serialize};

/// One curated question/answer pair. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Text fed to the embedder for this entry.
    pub fn corpus_text(&self) -> String {
        format!("Q: {}\nA: {}", self.question, self.answer)
    }
}

/// An entry ranked by vector similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    /// Position of the entry in the knowledge store.
    pub index: usize,
    pub entry: KnowledgeEntry,
    pub similarity: f32,
}

/// The best word-overlap candidate. Only produced for scores above zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalMatch {
    pub index: usize,
    pub entry: KnowledgeEntry,
    pub score: usize,
}

/// Outcome of one retrieval pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// Word-overlap match with a positive score.
    Lexical(LexicalMatch),
    /// Non-empty similarity ranking, highest first.
    Semantic(Vec<ScoredEntry>),
    /// Nothing relevant was found.
    NoMatch,
}

impl Retrieval {
    pub fn is_match(&self) -> bool {
        !matches!(self, Retrieval::NoMatch)
    }
}

/// Cosine similarity `(a.b) / (|a||b|)`.
///
/// Returns exactly `0.0` when either vector has zero norm or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Indices and similarities of the `k` vectors closest to `query`, highest first.
pub fn rank_by_similarity(query: &[f32], vectors: &[Vec<f32>], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| (i, cosine_similarity(query, v)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_text_format() {
        let e = KnowledgeEntry::new("What is your role?", "Engineer.");
        assert_eq!(e.corpus_text(), "Q: What is your role?\nA: Engineer.");
    }

    #[test]
    fn cosine_identical_is_one() {
        let v = vec![0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_opposite_is_minus_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_zero_vector_is_exactly_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn rank_orders_descending_and_truncates() {
        let vectors = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        let ranked = rank_by_similarity(&[1.0, 0.0], &vectors, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 2);
    }

    #[test]
    fn retrieval_is_match() {
        assert!(!Retrieval::NoMatch.is_match());
        assert!(Retrieval::Semantic(vec![]).is_match());
    }
}
