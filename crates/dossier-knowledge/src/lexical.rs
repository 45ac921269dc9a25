// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word-overlap matching, the deterministic fallback retriever.

use std::collections::HashSet;

use crate::types::{KnowledgeEntry, LexicalMatch};

/// Lowercased whitespace-separated word set.
fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Distinct words of `question` that appear in `query_words`.
fn shared_words(query_words: &HashSet<String>, question: &str) -> usize {
    word_set(question)
        .iter()
        .filter(|w| query_words.contains(*w))
        .count()
}

/// Number of distinct words shared by `query` and `question`.
pub fn overlap_score(query: &str, question: &str) -> usize {
    shared_words(&word_set(query), question)
}

/// The entry whose question shares the most words with `query`.
///
/// The first entry wins ties. `None` when no entry shares any word.
pub fn best_match(query: &str, entries: &[KnowledgeEntry]) -> Option<LexicalMatch> {
    let query_words = word_set(query);
    let mut best: Option<LexicalMatch> = None;
    let mut best_score = 0;

    for (index, entry) in entries.iter().enumerate() {
        let score = shared_words(&query_words, &entry.question);
        if score > best_score {
            best_score = score;
            best = Some(LexicalMatch {
                index,
                entry: entry.clone(),
                score,
            });
        }
    }

    best
}
