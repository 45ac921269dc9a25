// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Dossier chat backend.
//!
//! TOML configuration with strict `deny_unknown_fields` parsing, XDG file
//! lookup, `DOSSIER_*` environment overrides, and miette diagnostics with
//! typo suggestions. [`load_or_fallback`] never fails: a malformed source is
//! reported and replaced by the compiled defaults so the server still boots.
//!
//! # Usage
//!
//! ```no_run
//! let config = dossier_config::load_or_fallback(None);
//! println!("model: {}", config.llm.model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DossierConfig, RetrievalStrategy};

/// Load configuration (from `path` when given, else the XDG hierarchy) and validate it.
pub fn load_and_validate(path: Option<&Path>) -> Result<DossierConfig, Vec<ConfigError>> {
    let loaded = match path {
        Some(p) => loader::load_config_from_path(p),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(path),
        )),
    }
}

/// Load an inline TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<DossierConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load and validate, falling back to the compiled defaults on any error.
///
/// Diagnostics are rendered to stderr because logging is not initialized
/// until the configuration (which carries the log level) is known.
pub fn load_or_fallback(path: Option<&Path>) -> DossierConfig {
    match load_and_validate(path) {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            eprintln!(
                "dossier: configuration rejected ({} problem(s)); continuing with built-in defaults",
                errors.len()
            );
            DossierConfig::default()
        }
    }
}

/// Collect TOML file contents for error span resolution.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let candidates: Vec<std::path::PathBuf> = match explicit {
        Some(p) => vec![p.to_path_buf()],
        None => {
            let mut paths = vec![std::path::PathBuf::from("/etc/dossier/dossier.toml")];
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("dossier/dossier.toml"));
            }
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd.join("dossier.toml"));
            }
            paths
        }
    };

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
