// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dossier serve` implementation.
//!
//! Loads the knowledge base, builds the provider and retriever, wires the
//! chat pipeline into the gateway and serves until a shutdown signal.

use std::sync::Arc;

use dossier_agent::{ChatEngine, ResponseComposer};
use dossier_config::model::LlmConfig;
use dossier_config::{DossierConfig, RetrievalStrategy};
use dossier_core::{DossierError, EmbeddingAdapter, ProviderAdapter};
use dossier_gateway::{AuthConfig, GatewayState, ServerConfig, start_server};
use dossier_knowledge::{
    AdaptiveRetriever, KnowledgeStore, LexicalRetriever, Retriever, SemanticRetriever,
};
use dossier_ledger::{AnalyticsStore, ConversationLedger};
use dossier_openai::{OpenAiEmbedder, OpenAiProvider};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `dossier serve` command.
pub async fn run_serve(config: DossierConfig) -> Result<(), DossierError> {
    init_tracing(&config.logging.level);
    info!("starting dossier serve");

    let state = build_state(&config).await?;
    let engine = Arc::clone(&state.engine);
    let token = shutdown::install_signal_handler();

    let served = start_server(
        &ServerConfig::from(&config.gateway),
        state,
        token.cancelled_owned(),
    )
    .await;
    engine.shutdown().await;
    served?;

    info!("dossier serve shutdown complete");
    Ok(())
}

/// Assemble the gateway state. A knowledge base that fails to load is fatal.
pub async fn build_state(config: &DossierConfig) -> Result<GatewayState, DossierError> {
    let knowledge = KnowledgeStore::load(&config.knowledge)?;
    info!(
        qa_pairs = knowledge.len(),
        resume = knowledge.resume().is_some(),
        path = %config.knowledge.path,
        "knowledge base loaded"
    );

    let provider = build_provider(&config.llm);
    let retriever = build_retriever(config, &knowledge).await;

    let ledger = Arc::new(ConversationLedger::new(&config.ledger.logs_dir));
    let analytics = Arc::new(AnalyticsStore::new(config.ledger.recent_events_limit));
    let composer = ResponseComposer::new(
        provider,
        config.llm.clone(),
        &config.bot,
        knowledge.resume(),
    );
    let engine = Arc::new(ChatEngine::new(composer, retriever, ledger, analytics));

    let auth = AuthConfig::new(config.gateway.bearer_token.clone());
    if auth.bearer_token.is_none() {
        warn!("no gateway.bearer_token configured; inspection routes will reject every request");
    }

    Ok(GatewayState::new(engine, knowledge, auth))
}

/// The completion provider, or `None` when no API key is configured.
fn build_provider(llm: &LlmConfig) -> Option<Arc<dyn ProviderAdapter>> {
    match OpenAiProvider::from_config(llm) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "completion provider unavailable; chat will answer with the fallback reply");
            None
        }
    }
}

async fn build_retriever(config: &DossierConfig, store: &KnowledgeStore) -> Arc<dyn Retriever> {
    if config.retrieval.strategy == RetrievalStrategy::Lexical {
        info!("lexical retrieval selected");
        return Arc::new(LexicalRetriever::new(store.clone()));
    }

    let embedder = OpenAiEmbedder::from_config(&config.llm, &config.embedder)
        .map(|e| Arc::new(e) as Arc<dyn EmbeddingAdapter>);
    select_retriever(config, store, embedder).await
}

/// Semantic retrieval over `embedder` when it could be built, lexical otherwise.
async fn select_retriever(
    config: &DossierConfig,
    store: &KnowledgeStore,
    embedder: Result<Arc<dyn EmbeddingAdapter>, DossierError>,
) -> Arc<dyn Retriever> {
    let strategy = config.retrieval.strategy;
    let embedder = match embedder {
        Ok(embedder) => embedder,
        Err(e) => {
            if strategy == RetrievalStrategy::Semantic {
                warn!(error = %e, "semantic retrieval requested but no embedder is available; falling back to lexical");
            } else {
                info!(error = %e, "no embedder available; falling back to lexical");
            }
            return Arc::new(LexicalRetriever::new(store.clone()));
        }
    };

    let semantic = Arc::new(SemanticRetriever::new(
        store.clone(),
        embedder,
        config.embedder.batch_size,
        config.retrieval.top_k,
    ));
    if semantic.warm_up().await {
        info!(%strategy, entries = store.len(), "semantic retrieval ready");
    }
    Arc::new(AdaptiveRetriever::new(semantic, store.clone()))
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dossier={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use dossier_test_utils::MockEmbedder;
    use tracing_test::traced_test;

    use super::*;

    fn store() -> KnowledgeStore {
        KnowledgeStore::from_json_str(
            r#"[{"question": "Where are you based?", "answer": "Lisbon."}]"#,
            "questions_and_answers",
        )
        .unwrap()
    }

    fn config_with(strategy: RetrievalStrategy) -> DossierConfig {
        let mut config = DossierConfig::default();
        config.retrieval.strategy = strategy;
        config
    }

    #[tokio::test]
    async fn lexical_strategy_never_builds_an_embedder() {
        let retriever = build_retriever(&config_with(RetrievalStrategy::Lexical), &store()).await;
        assert_eq!(retriever.strategy(), "lexical");
        assert!(!retriever.embeddings_ready());
    }

    #[tokio::test]
    async fn semantic_strategy_warms_up_embeddings() {
        let embedder = Arc::new(MockEmbedder::new());
        let retriever = select_retriever(
            &config_with(RetrievalStrategy::Semantic),
            &store(),
            Ok(embedder.clone()),
        )
        .await;
        assert_eq!(retriever.strategy(), "semantic");
        assert!(retriever.embeddings_ready());
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn failed_warm_up_still_selects_semantic() {
        let embedder = Arc::new(MockEmbedder::new());
        embedder.fail_next(1);
        let retriever = select_retriever(
            &config_with(RetrievalStrategy::Auto),
            &store(),
            Ok(embedder),
        )
        .await;
        assert_eq!(retriever.strategy(), "semantic");
        assert!(!retriever.embeddings_ready());
    }

    #[tokio::test]
    #[traced_test]
    async fn semantic_without_embedder_falls_back_to_lexical() {
        let retriever = select_retriever(
            &config_with(RetrievalStrategy::Semantic),
            &store(),
            Err(DossierError::ProviderUnavailable("no key".to_string())),
        )
        .await;
        assert_eq!(retriever.strategy(), "lexical");
        assert!(logs_contain("falling back to lexical"));
    }

    #[tokio::test]
    async fn build_state_fails_on_malformed_knowledge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(&path, r#"{"unexpected": true}"#).unwrap();

        let mut config = DossierConfig::default();
        config.knowledge.path = path.display().to_string();
        config.ledger.logs_dir = dir.path().join("logs").display().to_string();

        let err = build_state(&config).await.err().unwrap();
        assert!(matches!(err, DossierError::Format { .. }));
    }

    #[tokio::test]
    async fn build_state_loads_knowledge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(
            &path,
            r#"{"questions_and_answers": [{"question": "Q1?", "answer": "A1."}, {"question": "Q2?", "answer": "A2."}]}"#,
        )
        .unwrap();

        let mut config = DossierConfig::default();
        config.knowledge.path = path.display().to_string();
        config.ledger.logs_dir = dir.path().join("logs").display().to_string();

        let state = build_state(&config).await.unwrap();
        assert_eq!(state.knowledge.len(), 2);
        assert_eq!(state.engine.retriever().strategy(), "lexical");
    }
}
