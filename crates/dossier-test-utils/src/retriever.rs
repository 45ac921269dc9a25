// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A retriever wrapper that counts calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use dossier_core::DossierError;
use dossier_knowledge::{Retrieval, Retriever};

/// Delegates to an inner retriever, counting `retrieve` calls.
pub struct CountingRetriever {
    inner: Arc<dyn Retriever>,
    calls: AtomicUsize,
}

impl CountingRetriever {
    pub fn new(inner: Arc<dyn Retriever>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for CountingRetriever {
    fn strategy(&self) -> &'static str {
        self.inner.strategy()
    }

    fn embeddings_ready(&self) -> bool {
        self.inner.embeddings_ready()
    }

    async fn retrieve(&self, query: &str) -> Result<Retrieval, DossierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.retrieve(query).await
    }

    async fn shutdown(&self) -> Result<(), DossierError> {
        self.inner.shutdown().await
    }
}
