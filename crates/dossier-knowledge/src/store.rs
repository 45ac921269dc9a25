// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading and holding the curated knowledge base.

use std::path::Path;
use std::sync::Arc;

use dossier_config::model::KnowledgeConfig;
use dossier_core::DossierError;
use serde_json::Value;
use tracing::{info, warn};

use crate::types::KnowledgeEntry;

/// Read-only knowledge base shared for the process lifetime.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    entries: Arc<[KnowledgeEntry]>,
    resume: Option<Arc<str>>,
}

impl KnowledgeStore {
    /// Load entries from `config.path` and the optional resume text.
    ///
    /// A malformed knowledge file is an error. A missing or unreadable resume
    /// is logged and treated as absent.
    pub fn load(config: &KnowledgeConfig) -> Result<Self, DossierError> {
        let content = std::fs::read_to_string(&config.path).map_err(|e| DossierError::Format {
            message: format!("cannot read knowledge file {}: {e}", config.path),
        })?;
        let entries = parse_entries(&content, &config.wrapper_field)?;
        info!(path = %config.path, entries = entries.len(), "knowledge base loaded");

        let resume = config.resume_path.as_deref().and_then(load_resume);
        Ok(Self {
            entries: entries.into(),
            resume,
        })
    }

    /// Parse a knowledge document already in memory.
    pub fn from_json_str(json: &str, wrapper_field: &str) -> Result<Self, DossierError> {
        Ok(Self::from_entries(parse_entries(json, wrapper_field)?))
    }

    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            entries: entries.into(),
            resume: None,
        }
    }

    pub fn with_resume(mut self, resume: impl Into<String>) -> Self {
        self.resume = Some(Arc::from(resume.into()));
        self
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&KnowledgeEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resume text, if one was configured and readable.
    pub fn resume(&self) -> Option<&str> {
        self.resume.as_deref()
    }
}

fn load_resume(path: &str) -> Option<Arc<str>> {
    match std::fs::read_to_string(Path::new(path)) {
        Ok(text) => {
            info!(path, bytes = text.len(), "resume loaded");
            Some(Arc::from(text))
        }
        Err(e) => {
            warn!(path, error = %e, "resume not available");
            None
        }
    }
}

/// Accepts a bare array of entries or an object holding the array under
/// `wrapper_field`. Any other shape is a format error.
pub fn parse_entries(json: &str, wrapper_field: &str) -> Result<Vec<KnowledgeEntry>, DossierError> {
    let root: Value = serde_json::from_str(json).map_err(|e| DossierError::Format {
        message: format!("knowledge source is not valid JSON: {e}"),
    })?;

    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(wrapper_field) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(DossierError::Format {
                    message: format!("field `{wrapper_field}` must be an array of entries"),
                });
            }
            None => {
                return Err(DossierError::Format {
                    message: format!("object has no `{wrapper_field}` field"),
                });
            }
        },
        _ => {
            return Err(DossierError::Format {
                message: format!(
                    "expected an array of entries or an object with `{wrapper_field}`"
                ),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_entry(i, item))
        .collect()
}

fn parse_entry(index: usize, item: &Value) -> Result<KnowledgeEntry, DossierError> {
    let field = |name: &str| {
        item.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DossierError::Format {
                message: format!("entry {index} lacks a string `{name}`"),
            })
    };
    Ok(KnowledgeEntry {
        question: field("question")?,
        answer: field("answer")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPER: &str = "questions_and_answers";

    #[test]
    fn parses_bare_array() {
        let json = r#"[{"question":"Q1","answer":"A1"},{"question":"Q2","answer":"A2"}]"#;
        let store = KnowledgeStore::from_json_str(json, WRAPPER).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[1], KnowledgeEntry::new("Q2", "A2"));
    }

    #[test]
    fn parses_wrapped_array_and_ignores_extra_fields() {
        let json = r#"{"owner":"x","questions_and_answers":[{"question":"Q","answer":"A","tags":["t"]}]}"#;
        let store = KnowledgeStore::from_json_str(json, WRAPPER).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn custom_wrapper_field() {
        let json = r#"{"faq":[{"question":"Q","answer":"A"}]}"#;
        assert_eq!(KnowledgeStore::from_json_str(json, "faq").unwrap().len(), 1);
        assert!(KnowledgeStore::from_json_str(json, WRAPPER).is_err());
    }

    #[test]
    fn rejects_other_shapes() {
        for json in [r#""text""#, "42", r#"{"questions_and_answers":{}}"#, "not json"] {
            let err = KnowledgeStore::from_json_str(json, WRAPPER).unwrap_err();
            assert!(matches!(err, DossierError::Format { .. }), "{json}: {err}");
        }
    }

    #[test]
    fn rejects_entry_without_string_answer() {
        let json = r#"[{"question":"Q","answer":"A"},{"question":"Q2","answer":7}]"#;
        let err = KnowledgeStore::from_json_str(json, WRAPPER).unwrap_err();
        assert!(err.to_string().contains("entry 1"), "{err}");
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(KnowledgeStore::from_json_str("[]", WRAPPER).unwrap().is_empty());
    }

    #[test]
    fn load_reads_file_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let kb = dir.path().join("qa.json");
        let resume = dir.path().join("resume.txt");
        std::fs::write(&kb, r#"[{"question":"Q","answer":"A"}]"#).unwrap();
        std::fs::write(&resume, "Experience: lots").unwrap();

        let config = KnowledgeConfig {
            path: kb.display().to_string(),
            wrapper_field: WRAPPER.into(),
            resume_path: Some(resume.display().to_string()),
        };
        let store = KnowledgeStore::load(&config).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.resume(), Some("Experience: lots"));
    }

    #[test]
    fn missing_resume_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let kb = dir.path().join("qa.json");
        std::fs::write(&kb, "[]").unwrap();

        let config = KnowledgeConfig {
            path: kb.display().to_string(),
            wrapper_field: WRAPPER.into(),
            resume_path: Some(dir.path().join("absent.txt").display().to_string()),
        };
        assert!(KnowledgeStore::load(&config).unwrap().resume().is_none());
    }

    #[test]
    fn missing_knowledge_file_is_a_format_error() {
        let config = KnowledgeConfig {
            path: "/nonexistent/qa.json".into(),
            ..KnowledgeConfig::default()
        };
        assert!(matches!(
            KnowledgeStore::load(&config),
            Err(DossierError::Format { .. })
        ));
    }
}
