// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a retrieval result into a reply.
//!
//! Builds the completion request (system prompt plus context block, then the
//! user message) and maps the outcome to exactly one terminal state.

use std::fmt;
use std::sync::Arc;

use dossier_config::model::{BotConfig, LlmConfig};
use dossier_core::ProviderAdapter;
use dossier_core::types::{ProviderMessage, ProviderRequest};
use dossier_knowledge::{LexicalMatch, Retrieval, ScoredEntry};
use serde::Serialize;
use tracing::{debug, error};

use crate::intent::Intent;
use crate::replies::CannedReplies;

/// How a chat request was resolved. Exactly one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "intent", rename_all = "snake_case")]
pub enum ReplyOutcome {
    /// No completion capability is configured.
    Unavailable,
    /// A conversational intent answered with a canned reply.
    IntentShortcut(Intent),
    /// Retrieval found context and the model answered.
    Matched,
    /// Retrieval found nothing relevant.
    NoMatch,
    /// The completion call failed.
    GenerationFailure,
}

impl fmt::Display for ReplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyOutcome::Unavailable => f.write_str("unavailable"),
            ReplyOutcome::IntentShortcut(intent) => write!(f, "intent:{intent}"),
            ReplyOutcome::Matched => f.write_str("matched"),
            ReplyOutcome::NoMatch => f.write_str("no_match"),
            ReplyOutcome::GenerationFailure => f.write_str("generation_failure"),
        }
    }
}

/// A reply and the terminal state that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub outcome: ReplyOutcome,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>, outcome: ReplyOutcome) -> Self {
        Self {
            reply: reply.into(),
            outcome,
        }
    }
}

/// Context block for a semantic ranking, with the resume appended when present.
pub fn semantic_context(hits: &[ScoredEntry], resume: Option<&str>) -> String {
    let mut lines = Vec::with_capacity(hits.len() * 3);
    for hit in hits {
        lines.push(format!("Q: {}", hit.entry.question));
        lines.push(format!("A: {}", hit.entry.answer));
        lines.push(String::new());
    }
    let qa_block = lines.join("\n");

    let resume_block = match resume.map(str::trim).filter(|r| !r.is_empty()) {
        Some(text) => format!("\n\n[RESUME]\n{text}"),
        None => String::new(),
    };

    format!("[Q&A KNOWLEDGE BASE]\n{qa_block}{resume_block}\n")
}

/// Context line for a single word-overlap match.
pub fn lexical_context(m: &LexicalMatch) -> String {
    format!(
        "Based on this Q&A: Q: {} A: {}",
        m.entry.question, m.entry.answer
    )
}

/// Assembles completion requests and maps their results.
pub struct ResponseComposer {
    provider: Option<Arc<dyn ProviderAdapter>>,
    llm: LlmConfig,
    system_prompt: String,
    replies: CannedReplies,
    resume: Option<Arc<str>>,
}

impl ResponseComposer {
    pub fn new(
        provider: Option<Arc<dyn ProviderAdapter>>,
        llm: LlmConfig,
        bot: &BotConfig,
        resume: Option<&str>,
    ) -> Self {
        Self {
            provider,
            llm,
            system_prompt: bot.system_prompt.clone(),
            replies: CannedReplies::from_bot(bot),
            resume: resume.map(Arc::from),
        }
    }

    /// Whether a completion capability is configured.
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<&Arc<dyn ProviderAdapter>> {
        self.provider.as_ref()
    }

    pub fn model(&self) -> &str {
        &self.llm.model
    }

    pub fn replies(&self) -> &CannedReplies {
        &self.replies
    }

    /// The completion request for a matched retrieval, or `None` for no match.
    pub fn build_request(&self, retrieval: &Retrieval, user_message: &str) -> Option<ProviderRequest> {
        let context = match retrieval {
            Retrieval::Semantic(hits) => semantic_context(hits, self.resume.as_deref()),
            Retrieval::Lexical(m) => lexical_context(m),
            Retrieval::NoMatch => return None,
        };

        Some(ProviderRequest {
            model: self.llm.model.clone(),
            messages: vec![
                ProviderMessage::system(format!("{}\n\n{context}", self.system_prompt)),
                ProviderMessage::user(user_message),
            ],
            temperature: self.llm.temperature,
            top_p: self.llm.top_p,
            max_tokens: self.llm.max_tokens,
        })
    }

    /// Resolve a retrieval into Matched, NoMatch, or GenerationFailure.
    ///
    /// Without a provider this yields Unavailable.
    pub async fn compose(&self, retrieval: &Retrieval, user_message: &str) -> ChatReply {
        let Some(provider) = self.provider.as_ref() else {
            return ChatReply::new(self.replies.unavailable.clone(), ReplyOutcome::Unavailable);
        };
        let Some(request) = self.build_request(retrieval, user_message) else {
            return ChatReply::new(self.replies.no_match.clone(), ReplyOutcome::NoMatch);
        };

        match provider.complete(request).await {
            Ok(response) => {
                debug!(
                    model = %response.model,
                    input_tokens = response.usage.map(|u| u.input_tokens),
                    output_tokens = response.usage.map(|u| u.output_tokens),
                    "completion received"
                );
                ChatReply::new(response.content.trim(), ReplyOutcome::Matched)
            }
            Err(e) => {
                error!(error = %e, model = %self.llm.model, "completion failed");
                ChatReply::new(self.replies.failure.clone(), ReplyOutcome::GenerationFailure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use dossier_knowledge::KnowledgeEntry;

    use super::*;

    fn hit(q: &str, a: &str) -> ScoredEntry {
        ScoredEntry {
            index: 0,
            entry: KnowledgeEntry::new(q, a),
            similarity: 0.9,
        }
    }

    #[test]
    fn semantic_context_layout() {
        let ctx = semantic_context(&[hit("Q1?", "A1."), hit("Q2?", "A2.")], None);
        assert_eq!(ctx, "[Q&A KNOWLEDGE BASE]\nQ: Q1?\nA: A1.\n\nQ: Q2?\nA: A2.\n\n");
    }

    #[test]
    fn semantic_context_appends_trimmed_resume() {
        let ctx = semantic_context(&[hit("Q?", "A.")], Some("  Ten years of Rust.\n"));
        assert_eq!(
            ctx,
            "[Q&A KNOWLEDGE BASE]\nQ: Q?\nA: A.\n\n\n[RESUME]\nTen years of Rust.\n"
        );
    }

    #[test]
    fn blank_resume_is_omitted() {
        let ctx = semantic_context(&[], Some("   "));
        assert_eq!(ctx, "[Q&A KNOWLEDGE BASE]\n\n");
    }

    #[test]
    fn lexical_context_layout() {
        let m = LexicalMatch {
            index: 0,
            entry: KnowledgeEntry::new("What is your current role?", "Engineer."),
            score: 4,
        };
        assert_eq!(
            lexical_context(&m),
            "Based on this Q&A: Q: What is your current role? A: Engineer."
        );
    }

    #[test]
    fn request_carries_system_context_and_parameters() {
        let bot = BotConfig {
            system_prompt: "Be brief.".into(),
            ..BotConfig::default()
        };
        let composer = ResponseComposer::new(None, LlmConfig::default(), &bot, None);
        let m = LexicalMatch {
            index: 0,
            entry: KnowledgeEntry::new("Q?", "A."),
            score: 1,
        };

        let req = composer
            .build_request(&Retrieval::Lexical(m), "q please")
            .unwrap();
        assert_eq!(req.messages.len(), 2);
        assert_eq!(
            req.messages[0].content,
            "Be brief.\n\nBased on this Q&A: Q: Q? A: A."
        );
        assert_eq!(req.messages[1], ProviderMessage::user("q please"));
        assert_eq!(req.max_tokens, 900);
        assert_eq!(req.model, "gpt-4o-mini");

        assert!(composer.build_request(&Retrieval::NoMatch, "x").is_none());
    }

    #[tokio::test]
    async fn no_provider_is_unavailable() {
        let composer = ResponseComposer::new(None, LlmConfig::default(), &BotConfig::default(), None);
        let reply = composer.compose(&Retrieval::NoMatch, "x").await;
        assert_eq!(reply.outcome, ReplyOutcome::Unavailable);
        assert!(reply.reply.starts_with("AI assistant is currently unavailable."));
    }

    #[test]
    fn outcome_serialization() {
        let json = serde_json::to_value(ReplyOutcome::IntentShortcut(Intent::Help)).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "intent_shortcut", "intent": "help"}));
        assert_eq!(ReplyOutcome::NoMatch.to_string(), "no_match");
    }
}
