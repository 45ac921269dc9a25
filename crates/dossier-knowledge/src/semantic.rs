// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine-similarity retrieval over precomputed entry embeddings.
//!
//! Entry vectors are computed once, at startup via [`SemanticRetriever::warm_up`]
//! or lazily by the first search after a failed warm-up. `OnceCell` makes
//! concurrent first searches share a single computation, and a failed
//! computation leaves the cell empty so the next search tries again.

use std::sync::Arc;

use dossier_core::DossierError;
use dossier_core::traits::{EmbeddingAdapter, PluginAdapter};
use dossier_core::types::EmbeddingInput;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::store::KnowledgeStore;
use crate::types::{KnowledgeEntry, ScoredEntry, rank_by_similarity};

/// Embed every entry's corpus text in batches, preserving entry order.
///
/// Fails if any batch returns a different number of vectors than it was given.
pub async fn embed_entries(
    embedder: &dyn EmbeddingAdapter,
    entries: &[KnowledgeEntry],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, DossierError> {
    let batch_size = batch_size.max(1);
    let mut vectors = Vec::with_capacity(entries.len());

    for (batch_no, batch) in entries.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(KnowledgeEntry::corpus_text).collect();
        let output = embedder.embed(EmbeddingInput { texts }).await?;
        if output.embeddings.len() != batch.len() {
            return Err(DossierError::Provider {
                message: format!(
                    "embedding batch {batch_no} returned {} vectors for {} entries",
                    output.embeddings.len(),
                    batch.len()
                ),
                source: None,
            });
        }
        vectors.extend(output.embeddings);
    }

    Ok(vectors)
}

/// Retriever ranking knowledge entries by embedding similarity.
pub struct SemanticRetriever {
    store: KnowledgeStore,
    embedder: Arc<dyn EmbeddingAdapter>,
    batch_size: usize,
    top_k: usize,
    vectors: OnceCell<Arc<[Vec<f32>]>>,
}

impl SemanticRetriever {
    pub fn new(
        store: KnowledgeStore,
        embedder: Arc<dyn EmbeddingAdapter>,
        batch_size: usize,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            batch_size,
            top_k,
            vectors: OnceCell::new(),
        }
    }

    /// True once entry vectors are available.
    pub fn is_ready(&self) -> bool {
        self.vectors.initialized()
    }

    pub async fn shutdown(&self) -> Result<(), DossierError> {
        debug!(embedder = self.embedder.name(), "shutting down embedder");
        self.embedder.shutdown().await
    }

    /// Startup embedding. Failure is logged and leaves the retriever not ready.
    pub async fn warm_up(&self) -> bool {
        match self.entry_vectors().await {
            Ok(vectors) => {
                info!(count = vectors.len(), "knowledge embeddings ready");
                true
            }
            Err(e) => {
                warn!(error = %e, "startup embedding failed; will retry on first semantic query");
                false
            }
        }
    }

    /// Entry vectors, computing them first if no earlier attempt succeeded.
    async fn entry_vectors(&self) -> Result<Arc<[Vec<f32>]>, DossierError> {
        let vectors = self
            .vectors
            .get_or_try_init(|| async {
                debug!(entries = self.store.len(), batch_size = self.batch_size, "embedding knowledge base");
                let vectors =
                    embed_entries(self.embedder.as_ref(), self.store.entries(), self.batch_size)
                        .await?;
                Ok::<_, DossierError>(Arc::from(vectors))
            })
            .await?;
        Ok(Arc::clone(vectors))
    }

    /// Up to `top_k` entries ranked by similarity to `query`, highest first.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredEntry>, DossierError> {
        let vectors = self.entry_vectors().await?;

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![query.to_string()],
            })
            .await?;
        let query_vector = output.embeddings.into_iter().next().ok_or_else(|| {
            DossierError::Provider {
                message: "embedding returned no vector for the query".into(),
                source: None,
            }
        })?;

        let hits = rank_by_similarity(&query_vector, &vectors, self.top_k)
            .into_iter()
            .filter_map(|(index, similarity)| {
                self.store.get(index).map(|entry| ScoredEntry {
                    index,
                    entry: entry.clone(),
                    similarity,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            hits = hits.len(),
            best = hits.first().map(|h| h.similarity),
            "semantic search complete"
        );
        Ok(hits)
    }
}
