// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-model wire capabilities.
//!
//! Newer OpenAI model generations reject `max_tokens` and require
//! `max_completion_tokens`. The choice is made once per model name.

/// Model-name prefixes of generations that take `max_completion_tokens`.
const COMPLETION_TOKEN_GENERATIONS: &[&str] = &["gpt-5", "o1", "o3", "o4"];

/// Which request field carries the output token limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimitParam {
    /// Legacy `max_tokens`.
    MaxTokens,
    /// `max_completion_tokens`, required by reasoning-era models.
    MaxCompletionTokens,
}

impl TokenLimitParam {
    /// The JSON field name sent on the wire.
    pub fn field_name(self) -> &'static str {
        match self {
            TokenLimitParam::MaxTokens => "max_tokens",
            TokenLimitParam::MaxCompletionTokens => "max_completion_tokens",
        }
    }
}

/// Capabilities resolved for a single model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    pub token_limit: TokenLimitParam,
}

impl ModelCapabilities {
    /// Resolve capabilities from a model name such as `gpt-5-mini`,
    /// `openai/o3-mini` or a fine-tuned `ft:o4-mini-2025-04-16:org::id`.
    /// A generation marker may open any `/`- or `:`-separated segment.
    /// Unknown models get the legacy parameter.
    pub fn for_model(model: &str) -> Self {
        let name = model.to_lowercase();
        let newer = name.split(['/', ':']).any(|segment| {
            COMPLETION_TOKEN_GENERATIONS
                .iter()
                .any(|prefix| segment.starts_with(prefix))
        });
        let token_limit = if newer {
            TokenLimitParam::MaxCompletionTokens
        } else {
            TokenLimitParam::MaxTokens
        };
        Self { token_limit }
    }

    /// Split a token limit into the `(max_tokens, max_completion_tokens)` pair
    /// with exactly one side populated.
    pub fn token_limit_fields(&self, limit: u32) -> (Option<u32>, Option<u32>) {
        match self.token_limit {
            TokenLimitParam::MaxTokens => (Some(limit), None),
            TokenLimitParam::MaxCompletionTokens => (None, Some(limit)),
        }
    }
}
