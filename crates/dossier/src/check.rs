// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dossier check`: validate the knowledge base without starting the server.

use std::fmt;

use dossier_config::{DossierConfig, RetrievalStrategy};
use dossier_core::DossierError;
use dossier_knowledge::KnowledgeStore;

/// What `dossier check` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub knowledge_path: String,
    pub qa_pairs: usize,
    pub resume_loaded: bool,
    pub strategy: RetrievalStrategy,
    pub api_key_present: bool,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "knowledge: {} ({} Q&A pairs)", self.knowledge_path, self.qa_pairs)?;
        writeln!(
            f,
            "resume: {}",
            if self.resume_loaded { "loaded" } else { "not configured" }
        )?;
        writeln!(f, "retrieval: {}", self.strategy)?;
        write!(
            f,
            "completion provider: {}",
            if self.api_key_present {
                "api key present"
            } else {
                "no api key (chat will answer with the fallback reply)"
            }
        )
    }
}

/// Load the knowledge base named by `config` and summarize it.
pub fn run_check(config: &DossierConfig) -> Result<CheckReport, DossierError> {
    let knowledge = KnowledgeStore::load(&config.knowledge)?;
    Ok(CheckReport {
        knowledge_path: config.knowledge.path.clone(),
        qa_pairs: knowledge.len(),
        resume_loaded: knowledge.resume().is_some(),
        strategy: config.retrieval.strategy,
        api_key_present: dossier_openai::resolve_api_key(config.llm.api_key.as_deref()).is_ok(),
    })
}
