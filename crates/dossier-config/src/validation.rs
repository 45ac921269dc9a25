// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks ranges and non-empty constraints that serde attributes cannot
//! express. All problems are collected; validation never fails fast.

use crate::diagnostic::ConfigError;
use crate::model::DossierConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &DossierConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.llm.model.trim().is_empty() {
        fail("llm.model must not be empty".to_string());
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        fail(format!(
            "llm.temperature must be between 0.0 and 2.0, got {}",
            config.llm.temperature
        ));
    }
    if !(config.llm.top_p > 0.0 && config.llm.top_p <= 1.0) {
        fail(format!(
            "llm.top_p must be in (0.0, 1.0], got {}",
            config.llm.top_p
        ));
    }
    if config.llm.max_tokens == 0 {
        fail("llm.max_tokens must be greater than zero".to_string());
    }
    if !config.llm.base_url.starts_with("http://") && !config.llm.base_url.starts_with("https://") {
        fail(format!(
            "llm.base_url `{}` must start with http:// or https://",
            config.llm.base_url
        ));
    }

    if config.embedder.batch_size == 0 {
        fail("embedder.batch_size must be greater than zero".to_string());
    }
    if config.retrieval.top_k == 0 {
        fail("retrieval.top_k must be greater than zero".to_string());
    }

    if config.knowledge.path.trim().is_empty() {
        fail("knowledge.path must not be empty".to_string());
    }
    if config.knowledge.wrapper_field.trim().is_empty() {
        fail("knowledge.wrapper_field must not be empty".to_string());
    }
    if config.ledger.logs_dir.trim().is_empty() {
        fail("ledger.logs_dir must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
