// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for similarity ranking and lexical scoring.

use dossier_knowledge::lexical::{best_match, overlap_score};
use dossier_knowledge::{KnowledgeEntry, cosine_similarity, rank_by_similarity};
use proptest::prelude::*;

fn vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, dim)
}

proptest! {
    #[test]
    fn cosine_is_symmetric((a, b) in (1usize..16).prop_flat_map(|d| (vector(d), vector(d)))) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-5, "{} vs {}", ab, ba);
    }

    #[test]
    fn cosine_of_self_is_one(v in vector(8)) {
        prop_assume!(v.iter().any(|x| x.abs() > 1e-3));
        prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn cosine_with_zero_vector_is_exactly_zero(v in vector(8)) {
        let zero = vec![0.0f32; 8];
        prop_assert_eq!(cosine_similarity(&v, &zero), 0.0);
        prop_assert_eq!(cosine_similarity(&zero, &v), 0.0);
    }

    #[test]
    fn ranking_is_bounded_sorted_and_in_range(
        query in vector(4),
        vectors in prop::collection::vec(vector(4), 0..20),
        k in 0usize..10,
    ) {
        let ranked = rank_by_similarity(&query, &vectors, k);
        prop_assert!(ranked.len() <= k);
        prop_assert!(ranked.len() <= vectors.len());
        for (i, _) in &ranked {
            prop_assert!(*i < vectors.len());
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn lexical_score_is_word_set_intersection(words in prop::collection::vec("[a-z]{1,6}", 0..8)) {
        let query = words.join(" ");
        let question = words.iter().rev().cloned().collect::<Vec<_>>().join(" ");
        let distinct: std::collections::HashSet<_> = words.iter().collect();
        prop_assert_eq!(overlap_score(&query, &question), distinct.len());
    }

    #[test]
    fn best_match_score_is_positive_and_maximal(
        query in "[a-c ]{0,20}",
        questions in prop::collection::vec("[a-c ]{0,20}", 1..6),
    ) {
        let entries: Vec<_> = questions.iter().map(|q| KnowledgeEntry::new(q.clone(), "a")).collect();
        let max = questions.iter().map(|q| overlap_score(&query, q)).max().unwrap_or(0);
        match best_match(&query, &entries) {
            Some(m) => {
                prop_assert!(m.score > 0);
                prop_assert_eq!(m.score, max);
                let first = questions.iter().position(|q| overlap_score(&query, q) == max);
                prop_assert_eq!(Some(m.index), first);
            }
            None => prop_assert_eq!(max, 0),
        }
    }
}
