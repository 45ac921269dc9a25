// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Dossier chat backend.

use thiserror::Error;

/// The primary error type used across all Dossier crates.
///
/// None of these variants ever reach a chat caller directly: the chat
/// pipeline converts every one of them into a textual reply.
#[derive(Debug, Error)]
pub enum DossierError {
    /// Configuration errors (invalid TOML, missing API key, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed knowledge source (neither an entry array nor a wrapped one).
    #[error("knowledge format error: {message}")]
    Format { message: String },

    /// No completion or embedding capability is configured.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The capability was configured but the call failed (network, auth, rate limit).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Lookup of a session or exported artifact that does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Durable storage errors (file IO, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DossierError {
    /// Wraps any IO or serialization failure as a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DossierError::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true when this error is a missing-record lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DossierError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_kind_and_id() {
        let err = DossierError::NotFound {
            kind: "session".into(),
            id: "0123abcd".into(),
        };
        assert_eq!(err.to_string(), "session not found: 0123abcd");
        assert!(err.is_not_found());
    }

    #[test]
    fn storage_helper_wraps_io_error() {
        let err = DossierError::storage(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
        assert!(!err.is_not_found());
    }
}
