// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The retrieval seam used by the chat pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use dossier_core::DossierError;
use tracing::{debug, warn};

use crate::lexical;
use crate::semantic::SemanticRetriever;
use crate::store::KnowledgeStore;
use crate::types::Retrieval;

/// Selects relevant knowledge entries for a user message.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Short name reported by health checks ("lexical", "semantic").
    fn strategy(&self) -> &'static str;

    /// Whether entry embeddings are available.
    fn embeddings_ready(&self) -> bool;

    async fn retrieve(&self, query: &str) -> Result<Retrieval, DossierError>;

    /// Release any adapters held by this retriever.
    async fn shutdown(&self) -> Result<(), DossierError> {
        Ok(())
    }
}

/// Word-overlap retrieval.
pub struct LexicalRetriever {
    store: KnowledgeStore,
}

impl LexicalRetriever {
    pub fn new(store: KnowledgeStore) -> Self {
        Self { store }
    }

    fn retrieve_now(&self, query: &str) -> Retrieval {
        match lexical::best_match(query, self.store.entries()) {
            Some(m) => {
                debug!(index = m.index, score = m.score, "lexical match");
                Retrieval::Lexical(m)
            }
            None => Retrieval::NoMatch,
        }
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    fn strategy(&self) -> &'static str {
        "lexical"
    }

    fn embeddings_ready(&self) -> bool {
        false
    }

    async fn retrieve(&self, query: &str) -> Result<Retrieval, DossierError> {
        Ok(self.retrieve_now(query))
    }
}

/// Semantic retrieval with a per-request lexical fallback when embedding fails.
pub struct AdaptiveRetriever {
    semantic: Arc<SemanticRetriever>,
    lexical: LexicalRetriever,
}

impl AdaptiveRetriever {
    pub fn new(semantic: Arc<SemanticRetriever>, store: KnowledgeStore) -> Self {
        Self {
            semantic,
            lexical: LexicalRetriever::new(store),
        }
    }

    pub fn semantic(&self) -> &Arc<SemanticRetriever> {
        &self.semantic
    }
}

#[async_trait]
impl Retriever for AdaptiveRetriever {
    fn strategy(&self) -> &'static str {
        "semantic"
    }

    fn embeddings_ready(&self) -> bool {
        self.semantic.is_ready()
    }

    async fn retrieve(&self, query: &str) -> Result<Retrieval, DossierError> {
        match self.semantic.search(query).await {
            Ok(hits) if hits.is_empty() => Ok(Retrieval::NoMatch),
            Ok(hits) => Ok(Retrieval::Semantic(hits)),
            Err(e) => {
                warn!(error = %e, "semantic retrieval failed; using lexical matcher for this turn");
                Ok(self.lexical.retrieve_now(query))
            }
        }
    }

    async fn shutdown(&self) -> Result<(), DossierError> {
        self.semantic.shutdown().await
    }
}
