// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Dossier chat backend.
//!
//! This crate provides the error type, the adapter traits implemented by the
//! completion and embedding providers, and the request/response types shared
//! across the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DossierError;
pub use types::{AdapterType, HealthStatus, SessionId};

// Re-export all adapter traits at crate root.
pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dossier_error_has_all_variants() {
        let _config = DossierError::Config("test".into());
        let _format = DossierError::Format {
            message: "test".into(),
        };
        let _unavailable = DossierError::ProviderUnavailable("test".into());
        let _provider = DossierError::Provider {
            message: "test".into(),
            source: None,
        };
        let _not_found = DossierError::NotFound {
            kind: "session".into(),
            id: "abc".into(),
        };
        let _storage = DossierError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = DossierError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Embedding] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
    }
}
