// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Dossier chat backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Every field has a default, so an empty file (or
//! no file at all) yields a bootable configuration.

use serde::{Deserialize, Serialize};

/// Top-level Dossier configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DossierConfig {
    /// Completion model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding model settings.
    #[serde(default)]
    pub embedder: EmbedderConfig,

    /// Assistant persona and contact details.
    #[serde(default)]
    pub bot: BotConfig,

    /// Knowledge source locations.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Retrieval strategy selection.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Conversation ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Model identifier sent to the completion endpoint.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling mass.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum output tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    900
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Embedding model configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedderConfig {
    /// Embedding model identifier.
    #[serde(default = "default_embed_model")]
    pub model: String,

    /// Number of entries per embedding request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model: default_embed_model(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_embed_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_batch_size() -> usize {
    64
}

/// Assistant persona, system prompt, and the contact details used in canned replies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Name of the person the assistant answers questions about.
    #[serde(default = "default_owner_name")]
    pub owner_name: String,

    /// System prompt prepended to every completion request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Contact email offered in fallback replies.
    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    /// LinkedIn profile offered in fallback replies.
    #[serde(default = "default_linkedin_url")]
    pub linkedin_url: String,

    /// Scheduling link offered on goodbye.
    #[serde(default = "default_scheduling_url")]
    pub scheduling_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            owner_name: default_owner_name(),
            system_prompt: default_system_prompt(),
            contact_email: default_contact_email(),
            linkedin_url: default_linkedin_url(),
            scheduling_url: default_scheduling_url(),
        }
    }
}

fn default_owner_name() -> String {
    "the site owner".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional AI assistant. Answer questions about the site owner's \
     professional background using only the provided context. If the context does \
     not cover the question, say so and suggest reaching out directly."
        .to_string()
}

fn default_contact_email() -> String {
    "contact@example.com".to_string()
}

fn default_linkedin_url() -> String {
    "https://www.linkedin.com/".to_string()
}

fn default_scheduling_url() -> String {
    "https://calendly.com/".to_string()
}

/// Knowledge source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Path to the question/answer JSON file.
    #[serde(default = "default_knowledge_path")]
    pub path: String,

    /// Field name under which a wrapped object carries the entry array.
    #[serde(default = "default_wrapper_field")]
    pub wrapper_field: String,

    /// Optional plain-text resume appended to semantic context and served at `/resume`.
    #[serde(default)]
    pub resume_path: Option<String>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            wrapper_field: default_wrapper_field(),
            resume_path: None,
        }
    }
}

fn default_knowledge_path() -> String {
    "knowledge.json".to_string()
}

fn default_wrapper_field() -> String {
    "questions_and_answers".to_string()
}

/// Which retriever backs the chat pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    /// Word-overlap matching only.
    #[default]
    Lexical,
    /// Embedding similarity, falling back to lexical when embeddings fail.
    Semantic,
    /// Semantic when an embedding provider is available, lexical otherwise.
    Auto,
}

impl std::fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalStrategy::Lexical => write!(f, "lexical"),
            RetrievalStrategy::Semantic => write!(f, "semantic"),
            RetrievalStrategy::Auto => write!(f, "auto"),
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub strategy: RetrievalStrategy,

    /// Number of entries returned by semantic retrieval.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: RetrievalStrategy::default(),
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    6
}

/// Conversation ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Directory holding per-session logs and exports.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,

    /// Capacity of the recent-visitor and recent-chat analytics lists.
    #[serde(default = "default_recent_events_limit")]
    pub recent_events_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            recent_events_limit: default_recent_events_limit(),
        }
    }
}

fn default_logs_dir() -> String {
    "conversation_logs".to_string()
}

fn default_recent_events_limit() -> usize {
    100
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token guarding the inspection endpoints. `None` rejects them all.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DossierConfig {
    /// Returns a copy with every secret replaced by a placeholder, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.api_key.is_some() {
            copy.llm.api_key = Some("[redacted]".to_string());
        }
        if copy.gateway.bearer_token.is_some() {
            copy.gateway.bearer_token = Some("[redacted]".to_string());
        }
        copy
    }
}
