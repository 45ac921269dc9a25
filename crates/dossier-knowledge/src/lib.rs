// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base and retrieval for the Dossier chat backend.
//!
//! - [`KnowledgeStore`]: the immutable question/answer set (plus optional resume).
//! - [`lexical`]: word-overlap scoring, always available.
//! - [`SemanticRetriever`]: cosine similarity over remote embeddings.
//! - [`Retriever`]: the seam the chat pipeline calls, with lexical and
//!   adaptive (semantic with lexical fallback) implementations.

pub mod lexical;
pub mod retriever;
pub mod semantic;
pub mod store;
pub mod types;

pub use retriever::{AdaptiveRetriever, LexicalRetriever, Retriever};
pub use semantic::{SemanticRetriever, embed_entries};
pub use store::KnowledgeStore;
pub use types::{
    KnowledgeEntry, LexicalMatch, Retrieval, ScoredEntry, cosine_similarity, rank_by_similarity,
};
