// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-request chat pipeline.
//!
//! Availability check, intent pre-filter, retrieval, composition, then the
//! ledger. Every request ends in a reply; nothing here returns an error.

use std::sync::Arc;

use dossier_core::{HealthStatus, PluginAdapter};
use dossier_knowledge::{Retrieval, Retriever};
use dossier_ledger::{AnalyticsStore, CallerInfo, ConversationLedger};
use tracing::{debug, error, info, warn};

use crate::composer::{ChatReply, ReplyOutcome, ResponseComposer};
use crate::intent::detect_intent;

/// Wires the pipeline stages together. Cheap to share behind an `Arc`.
pub struct ChatEngine {
    composer: ResponseComposer,
    retriever: Arc<dyn Retriever>,
    ledger: Arc<ConversationLedger>,
    analytics: Arc<AnalyticsStore>,
}

impl ChatEngine {
    pub fn new(
        composer: ResponseComposer,
        retriever: Arc<dyn Retriever>,
        ledger: Arc<ConversationLedger>,
        analytics: Arc<AnalyticsStore>,
    ) -> Self {
        Self {
            composer,
            retriever,
            ledger,
            analytics,
        }
    }

    pub fn composer(&self) -> &ResponseComposer {
        &self.composer
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }

    pub fn ledger(&self) -> &Arc<ConversationLedger> {
        &self.ledger
    }

    pub fn analytics(&self) -> &Arc<AnalyticsStore> {
        &self.analytics
    }

    /// Health of the completion provider, `None` when none is configured.
    /// A failed check counts as unhealthy.
    pub async fn provider_health(&self) -> Option<HealthStatus> {
        let provider = self.composer.provider()?;
        Some(match provider.health_check().await {
            Ok(status) => status,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    /// Shut down the provider and the retriever's adapters. Errors are logged.
    pub async fn shutdown(&self) {
        if let Some(provider) = self.composer.provider() {
            if let Err(e) = provider.shutdown().await {
                warn!(adapter = provider.name(), error = %e, "provider shutdown error");
            }
        }
        if let Err(e) = self.retriever.shutdown().await {
            warn!(strategy = self.retriever.strategy(), error = %e, "retriever shutdown error");
        }
        debug!("chat engine shut down");
    }

    /// Answer one message from `caller` and log the turn.
    pub async fn handle(&self, caller: &CallerInfo, message: &str) -> ChatReply {
        let reply = self.resolve(message).await;
        info!(outcome = %reply.outcome, message_len = message.len(), "chat resolved");
        self.log_turn(caller, message, &reply.reply).await;
        reply
    }

    /// Log a turn whose reply was produced outside the pipeline (e.g. an
    /// unreadable request body).
    pub async fn log_turn(&self, caller: &CallerInfo, message: &str, reply: &str) {
        let session_id = self.ledger.session_id_for(caller);
        match self.ledger.record(&session_id, caller, message, reply).await {
            Ok(turn) => {
                self.analytics.record_chat(
                    &session_id,
                    caller,
                    turn.message_length,
                    turn.response_length,
                );
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to record conversation turn");
                self.analytics.record_chat(
                    &session_id,
                    caller,
                    message.chars().count(),
                    reply.chars().count(),
                );
            }
        }
    }

    async fn resolve(&self, message: &str) -> ChatReply {
        let replies = self.composer.replies();

        if !self.composer.is_available() {
            return ChatReply::new(replies.unavailable.clone(), ReplyOutcome::Unavailable);
        }

        if let Some(intent) = detect_intent(message) {
            debug!(%intent, "intent short-circuit");
            return ChatReply::new(replies.for_intent(intent), ReplyOutcome::IntentShortcut(intent));
        }

        let retrieval = match self.retriever.retrieve(message).await {
            Ok(retrieval) => retrieval,
            Err(e) => {
                error!(error = %e, strategy = self.retriever.strategy(), "retrieval failed");
                return ChatReply::new(replies.failure.clone(), ReplyOutcome::GenerationFailure);
            }
        };
        match &retrieval {
            Retrieval::Lexical(m) => debug!(score = m.score, index = m.index, "lexical retrieval"),
            Retrieval::Semantic(hits) => debug!(hits = hits.len(), "semantic retrieval"),
            Retrieval::NoMatch => debug!("no retrieval match"),
        }

        self.composer.compose(&retrieval, message).await
    }
}
