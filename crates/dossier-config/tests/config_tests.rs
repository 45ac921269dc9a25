// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Dossier configuration system.

use dossier_config::diagnostic::ConfigError;
use dossier_config::model::RetrievalStrategy;
use dossier_config::{load_and_validate_str, load_config_from_str, load_or_fallback};

/// Valid TOML with every section deserializes successfully.
#[test]
fn valid_toml_deserializes_into_dossier_config() {
    let toml = r#"
[llm]
model = "gpt-5-mini"
temperature = 0.2
top_p = 0.9
max_tokens = 500

[embedder]
model = "text-embedding-3-small"
batch_size = 32

[bot]
owner_name = "Ada Lovelace"
system_prompt = "You answer questions about Ada."
contact_email = "ada@example.com"

[knowledge]
path = "/srv/qa.json"
resume_path = "/srv/resume.txt"

[retrieval]
strategy = "semantic"
top_k = 4

[ledger]
logs_dir = "/var/log/dossier"

[gateway]
host = "127.0.0.1"
port = 9000
bearer_token = "inspect-me"

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.llm.model, "gpt-5-mini");
    assert_eq!(config.llm.max_tokens, 500);
    assert!((config.llm.top_p - 0.9).abs() < f32::EPSILON);
    assert_eq!(config.embedder.batch_size, 32);
    assert_eq!(config.bot.owner_name, "Ada Lovelace");
    assert_eq!(config.knowledge.resume_path.as_deref(), Some("/srv/resume.txt"));
    assert_eq!(config.retrieval.strategy, RetrievalStrategy::Semantic);
    assert_eq!(config.retrieval.top_k, 4);
    assert_eq!(config.ledger.logs_dir, "/var/log/dossier");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("inspect-me"));
    assert_eq!(config.logging.level, "debug");
}

/// Sections left out keep their defaults.
#[test]
fn partial_toml_keeps_defaults() {
    let config = load_config_from_str("[llm]\nmodel = \"gpt-4o\"\n").unwrap();
    assert_eq!(config.llm.model, "gpt-4o");
    assert_eq!(config.llm.max_tokens, 900);
    assert_eq!(config.embedder.batch_size, 64);
    assert_eq!(config.knowledge.wrapper_field, "questions_and_answers");
}

/// A misspelled key yields an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_gets_suggestion() {
    let errors = load_and_validate_str("[llm]\ntemprature = 0.5\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "temprature");
            assert_eq!(suggestion.as_deref(), Some("temperature"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// A wrongly typed value yields an InvalidType diagnostic.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Unknown retrieval strategies are rejected.
#[test]
fn unknown_strategy_is_rejected() {
    assert!(load_and_validate_str("[retrieval]\nstrategy = \"magic\"\n").is_err());
}

/// Semantic validation runs after deserialization.
#[test]
fn out_of_range_values_fail_validation() {
    let errors = load_and_validate_str("[llm]\ntemperature = 9.0\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// A malformed file never stops the process: defaults are returned instead.
#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[llm\nmodel = ").unwrap();

    let config = load_or_fallback(Some(&path));
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.gateway.port, 8000);
}

/// A missing file is not an error: defaults apply.
#[test]
fn missing_file_uses_defaults() {
    let path = std::path::Path::new("/nonexistent/dossier/dossier.toml");
    let config = load_or_fallback(Some(path));
    assert_eq!(config.retrieval.top_k, 6);
}
