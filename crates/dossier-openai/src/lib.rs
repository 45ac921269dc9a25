// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible adapters for the Dossier chat backend.
//!
//! [`OpenAiProvider`] implements [`ProviderAdapter`] against
//! `/chat/completions`; [`OpenAiEmbedder`] implements [`EmbeddingAdapter`]
//! against `/embeddings`. Both share the retrying [`OpenAiClient`].

pub mod capabilities;
pub mod client;
pub mod types;

use async_trait::async_trait;
use dossier_config::model::{EmbedderConfig, LlmConfig};
use dossier_core::error::DossierError;
use dossier_core::traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
use dossier_core::types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, ProviderRequest,
    ProviderResponse, TokenUsage,
};
use tracing::{debug, info};

pub use capabilities::{ModelCapabilities, TokenLimitParam};
pub use client::OpenAiClient;

use crate::types::{ChatCompletionRequest, ChatMessage, EmbeddingRequest};

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat completion provider implementing [`ProviderAdapter`].
///
/// API key resolution order: `llm.api_key` -> `OPENAI_API_KEY` -> unavailable.
pub struct OpenAiProvider {
    client: OpenAiClient,
    model: String,
    capabilities: ModelCapabilities,
}

impl OpenAiProvider {
    /// Creates a provider from the `[llm]` section.
    pub fn from_config(llm: &LlmConfig) -> Result<Self, DossierError> {
        let api_key = resolve_api_key(llm.api_key.as_deref())?;
        let client = OpenAiClient::new(&api_key, &llm.base_url)?;
        let capabilities = ModelCapabilities::for_model(&llm.model);

        info!(
            model = %llm.model,
            token_limit = capabilities.token_limit.field_name(),
            "OpenAI provider initialized"
        );

        Ok(Self {
            client,
            model: llm.model.clone(),
            capabilities,
        })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Capabilities resolved for the configured model.
    pub fn capabilities(&self) -> ModelCapabilities {
        self.capabilities
    }

    fn to_completion_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let capabilities = if request.model == self.model {
            self.capabilities
        } else {
            ModelCapabilities::for_model(&request.model)
        };
        let (max_tokens, max_completion_tokens) =
            capabilities.token_limit_fields(request.max_tokens);

        ChatCompletionRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens,
            max_completion_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, DossierError> {
        // No API call: health checks must not spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DossierError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, DossierError> {
        let api_request = self.to_completion_request(&request);
        let response = self.client.chat_completion(&api_request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DossierError::Provider {
                message: "completion response contained no message content".into(),
                source: None,
            })?;

        Ok(ProviderResponse {
            id: response.id,
            content,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

/// Remote embedding adapter implementing [`EmbeddingAdapter`].
///
/// Sends all input texts in one request; batching is the caller's concern.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    /// Creates an embedder using the `[llm]` credentials and the `[embedder]` model.
    pub fn from_config(llm: &LlmConfig, embedder: &EmbedderConfig) -> Result<Self, DossierError> {
        let api_key = resolve_api_key(llm.api_key.as_deref())?;
        let client = OpenAiClient::new(&api_key, &llm.base_url)?;
        info!(model = %embedder.model, "OpenAI embedder initialized");
        Ok(Self {
            client,
            model: embedder.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, DossierError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DossierError> {
        debug!("OpenAI embedder shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DossierError> {
        let expected = input.texts.len();
        if expected == 0 {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let response = self.client.embeddings(&request).await?;

        // The API may return data out of order; `index` is authoritative.
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
        for item in response.data {
            match slots.get_mut(item.index) {
                Some(slot) => *slot = Some(item.embedding),
                None => {
                    return Err(DossierError::Provider {
                        message: format!(
                            "embedding index {} out of range for {expected} inputs",
                            item.index
                        ),
                        source: None,
                    });
                }
            }
        }

        let embeddings = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| DossierError::Provider {
                    message: format!("embedding response is missing index {i}"),
                    source: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let dimensions = embeddings.first().map_or(0, Vec::len);

        debug!(count = embeddings.len(), dimensions, "embeddings received");
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}

/// Resolves the API key from config or the `OPENAI_API_KEY` environment variable.
///
/// An empty value counts as absent. No key means the capability is unavailable.
pub fn resolve_api_key(config_key: Option<&str>) -> Result<String, DossierError> {
    if let Some(key) = config_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            DossierError::ProviderUnavailable(format!(
                "OpenAI API key not found. Set llm.api_key in config or the {API_KEY_ENV} environment variable."
            ))
        })
}
