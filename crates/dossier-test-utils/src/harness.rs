// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete chat pipeline with mock adapters and a
//! temporary ledger directory. `send_message()` drives the full pipeline.

use std::path::Path;
use std::sync::Arc;

use dossier_agent::{ChatEngine, ChatReply, ResponseComposer};
use dossier_config::model::{BotConfig, LlmConfig};
use dossier_core::{DossierError, ProviderAdapter};
use dossier_knowledge::{
    AdaptiveRetriever, KnowledgeEntry, KnowledgeStore, LexicalRetriever, Retriever,
    SemanticRetriever,
};
use dossier_ledger::{AnalyticsStore, CallerInfo, ConversationLedger};

use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::MockProvider;
use crate::retriever::CountingRetriever;

/// Caller used by `send_message`.
pub const TEST_IP: &str = "203.0.113.7";
pub const TEST_USER_AGENT: &str = "dossier-test/1.0";

enum ProviderMode {
    Responses(Vec<String>),
    Failing,
    Absent,
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    entries: Vec<KnowledgeEntry>,
    resume: Option<String>,
    provider: ProviderMode,
    semantic: bool,
    embedder_failures: usize,
    bot: BotConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            resume: None,
            provider: ProviderMode::Responses(Vec::new()),
            semantic: false,
            embedder_failures: 0,
            bot: BotConfig {
                owner_name: "Ada".to_string(),
                contact_email: "ada@example.com".to_string(),
                ..BotConfig::default()
            },
        }
    }

    /// Add a knowledge entry.
    pub fn with_entry(mut self, question: &str, answer: &str) -> Self {
        self.entries.push(KnowledgeEntry::new(question, answer));
        self
    }

    pub fn with_resume(mut self, resume: &str) -> Self {
        self.resume = Some(resume.to_string());
        self
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.provider = ProviderMode::Responses(responses);
        self
    }

    /// Configure a provider whose every call fails.
    pub fn with_failing_provider(mut self) -> Self {
        self.provider = ProviderMode::Failing;
        self
    }

    /// Run without any completion capability.
    pub fn without_provider(mut self) -> Self {
        self.provider = ProviderMode::Absent;
        self
    }

    /// Use adaptive (semantic first) retrieval backed by a `MockEmbedder`.
    pub fn semantic(mut self) -> Self {
        self.semantic = true;
        self
    }

    /// Make the first `n` embedding calls fail.
    pub fn with_embedder_failures(mut self, n: usize) -> Self {
        self.embedder_failures = n;
        self
    }

    pub fn with_bot(mut self, bot: BotConfig) -> Self {
        self.bot = bot;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, DossierError> {
        let temp_dir = tempfile::TempDir::new().map_err(DossierError::storage)?;

        let mut store = KnowledgeStore::from_entries(self.entries);
        if let Some(resume) = self.resume {
            store = store.with_resume(resume);
        }

        let provider = match self.provider {
            ProviderMode::Responses(responses) => Some(Arc::new(MockProvider::with_responses(responses))),
            ProviderMode::Failing => Some(Arc::new(MockProvider::failing())),
            ProviderMode::Absent => None,
        };
        let provider_dyn = provider
            .clone()
            .map(|p| p as Arc<dyn ProviderAdapter>);

        let (inner, embedder): (Arc<dyn Retriever>, Option<Arc<MockEmbedder>>) = if self.semantic {
            let embedder = Arc::new(MockEmbedder::new());
            embedder.fail_next(self.embedder_failures);
            let semantic = Arc::new(SemanticRetriever::new(
                store.clone(),
                embedder.clone(),
                16,
                6,
            ));
            semantic.warm_up().await;
            (
                Arc::new(AdaptiveRetriever::new(semantic, store.clone())),
                Some(embedder),
            )
        } else {
            (Arc::new(LexicalRetriever::new(store.clone())), None)
        };
        let retriever = Arc::new(CountingRetriever::new(inner));

        let ledger = Arc::new(ConversationLedger::new(temp_dir.path().join("logs")));
        let analytics = Arc::new(AnalyticsStore::new(100));
        let composer = ResponseComposer::new(
            provider_dyn,
            LlmConfig::default(),
            &self.bot,
            store.resume(),
        );
        let engine = Arc::new(ChatEngine::new(
            composer,
            retriever.clone(),
            ledger.clone(),
            analytics.clone(),
        ));

        Ok(TestHarness {
            engine,
            provider,
            embedder,
            retriever,
            ledger,
            analytics,
            store,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully assembled chat pipeline for tests.
pub struct TestHarness {
    engine: Arc<ChatEngine>,
    provider: Option<Arc<MockProvider>>,
    embedder: Option<Arc<MockEmbedder>>,
    retriever: Arc<CountingRetriever>,
    ledger: Arc<ConversationLedger>,
    analytics: Arc<AnalyticsStore>,
    store: KnowledgeStore,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The caller `send_message` uses.
    pub fn caller() -> CallerInfo {
        CallerInfo::new(TEST_IP, TEST_USER_AGENT)
    }

    /// Drive one message through the full pipeline.
    pub async fn send_message(&self, text: &str) -> ChatReply {
        self.engine.handle(&Self::caller(), text).await
    }

    pub fn engine(&self) -> &Arc<ChatEngine> {
        &self.engine
    }

    pub fn provider(&self) -> Option<&Arc<MockProvider>> {
        self.provider.as_ref()
    }

    pub fn embedder(&self) -> Option<&Arc<MockEmbedder>> {
        self.embedder.as_ref()
    }

    pub fn retriever(&self) -> &Arc<CountingRetriever> {
        &self.retriever
    }

    pub fn ledger(&self) -> &Arc<ConversationLedger> {
        &self.ledger
    }

    pub fn analytics(&self) -> &Arc<AnalyticsStore> {
        &self.analytics
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn logs_dir(&self) -> &Path {
        self.ledger.journal().dir()
    }
}
