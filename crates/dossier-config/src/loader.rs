// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dossier.toml` > `~/.config/dossier/dossier.toml` > `/etc/dossier/dossier.toml`
//! with environment variable overrides via `DOSSIER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DossierConfig;

/// Config sections recognised in `DOSSIER_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "llm",
    "embedder",
    "bot",
    "knowledge",
    "retrieval",
    "ledger",
    "gateway",
    "logging",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dossier/dossier.toml` (system-wide)
/// 3. `~/.config/dossier/dossier.toml` (user XDG config)
/// 4. `./dossier.toml` (local directory)
/// 5. `DOSSIER_*` environment variables
pub fn load_config() -> Result<DossierConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DossierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DossierConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DossierConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DossierConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard lookup (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DossierConfig::default()))
        .merge(Toml::file("/etc/dossier/dossier.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dossier/dossier.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dossier.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys survive: `DOSSIER_LLM_MAX_TOKENS` maps to `llm.max_tokens`, not
/// `llm.max.tokens`.
fn env_provider() -> Env {
    Env::prefixed("DOSSIER_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("llm_max_tokens"), "llm.max_tokens");
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(map_env_key("ledger_logs_dir"), "ledger.logs_dir");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn env_override_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[llm]
model = "gpt-4o"
"#,
            )?;
            jail.set_env("DOSSIER_LLM_MODEL", "gpt-5-mini");
            jail.set_env("DOSSIER_GATEWAY_PORT", "9100");

            let config = load_config_from_path(Path::new("custom.toml"))
                .expect("config should load");
            assert_eq!(config.llm.model, "gpt-5-mini");
            assert_eq!(config.gateway.port, 9100);
            Ok(())
        });
    }
}
