// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation sessions mirrored to the JSONL journal.
//!
//! Each session sits behind its own async mutex, held across the durable
//! append and the in-memory append so concurrent turns of one session are
//! numbered and written in the same order. A turn enters memory only after
//! its journal line is written.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dossier_core::{DossierError, SessionId};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::journal::Journal;
use crate::session::{CallerInfo, is_valid_session_id, session_of};
use crate::types::{
    ConversationExport, ConversationSession, ConversationTurn, DeleteOutcome, ExportOutcome,
    JournalRecord, SessionSummary,
};

/// Empty until the first `record` hydrates or creates the session.
type SessionSlot = Arc<Mutex<Option<ConversationSession>>>;

/// Process-wide conversation log.
pub struct ConversationLedger {
    journal: Journal,
    sessions: DashMap<String, SessionSlot>,
}

impl ConversationLedger {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            journal: Journal::new(logs_dir),
            sessions: DashMap::new(),
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Session id for `caller` today (UTC).
    pub fn session_id_for(&self, caller: &CallerInfo) -> SessionId {
        session_of(&caller.ip_address, &caller.user_agent, Utc::now().date_naive())
    }

    fn slot(&self, session_id: &str) -> SessionSlot {
        // Clone the Arc out so no map shard lock is held across an await.
        Arc::clone(self.sessions.entry(session_id.to_string()).or_default().value())
    }

    /// Append a turn to `session_id`, creating or hydrating the session first.
    pub async fn record(
        &self,
        session_id: &SessionId,
        caller: &CallerInfo,
        user_message: &str,
        bot_response: &str,
    ) -> Result<ConversationTurn, DossierError> {
        if !is_valid_session_id(session_id.as_str()) {
            return Err(DossierError::Internal(format!(
                "refusing to record malformed session id `{session_id}`"
            )));
        }

        let slot = self.slot(session_id.as_str());
        let mut guard = slot.lock().await;

        if guard.is_none() {
            *guard = Some(self.open_session(session_id, caller).await?);
        }
        let Some(session) = guard.as_mut() else {
            return Err(DossierError::Internal("session slot empty after open".into()));
        };

        let turn = ConversationTurn {
            turn_number: session.turns.len() as u32 + 1,
            timestamp: Utc::now(),
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            message_length: user_message.chars().count(),
            response_length: bot_response.chars().count(),
        };
        self.journal
            .append(session_id.as_str(), &JournalRecord::Turn(turn.clone()))
            .await?;

        session.turns.push(turn.clone());
        session.total_messages = session.turns.len();

        debug!(session_id = %session_id, turn = turn.turn_number, "turn recorded");
        Ok(turn)
    }

    /// Hydrate from an existing same-day journal, or start a new one.
    async fn open_session(
        &self,
        session_id: &SessionId,
        caller: &CallerInfo,
    ) -> Result<ConversationSession, DossierError> {
        if let Some(session) = self.journal.replay(session_id.as_str()).await? {
            info!(session_id = %session_id, turns = session.turns.len(), "session hydrated from journal");
            return Ok(session);
        }

        let session = ConversationSession {
            session_id: session_id.clone(),
            start_time: Utc::now(),
            ip_address: caller.ip_address.clone(),
            user_agent: caller.user_agent.clone(),
            turns: Vec::new(),
            total_messages: 0,
        };
        self.journal
            .append(
                session_id.as_str(),
                &JournalRecord::Started {
                    session_id: session.session_id.clone(),
                    start_time: session.start_time,
                    ip_address: session.ip_address.clone(),
                    user_agent: session.user_agent.clone(),
                },
            )
            .await?;
        info!(session_id = %session_id, "new session started");
        Ok(session)
    }

    /// Snapshot of every open in-memory session, oldest first.
    async fn snapshot(&self) -> Vec<ConversationSession> {
        let slots: Vec<SessionSlot> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut sessions = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(session) = slot.lock().await.as_ref() {
                sessions.push(session.clone());
            }
        }
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        sessions
    }

    /// Bundle all in-memory sessions and write them to the exports directory.
    pub async fn export_all(&self) -> Result<ExportOutcome, DossierError> {
        let sessions = self.snapshot().await;
        let export = ConversationExport {
            export_timestamp: Utc::now(),
            total_sessions: sessions.len(),
            total_turns: sessions.iter().map(|s| s.turns.len()).sum(),
            sessions,
        };
        let file = self.journal.write_export(&export).await?;
        info!(file = %file.display(), sessions = export.total_sessions, "conversations exported");
        Ok(ExportOutcome { file, export })
    }

    /// Look up a session in memory, then on disk.
    pub async fn get(&self, session_id: &str) -> Result<Option<ConversationSession>, DossierError> {
        if !is_valid_session_id(session_id) {
            return Ok(None);
        }

        let slot = self.sessions.get(session_id).map(|entry| Arc::clone(entry.value()));
        if let Some(slot) = slot {
            let guard = slot.lock().await;
            if let Some(session) = guard.as_ref() {
                return Ok(Some(session.clone()));
            }
        }
        self.journal.replay(session_id).await
    }

    /// Summaries of in-memory sessions, oldest first.
    pub async fn list(&self) -> Vec<SessionSummary> {
        self.snapshot()
            .await
            .iter()
            .map(ConversationSession::summary)
            .collect()
    }

    /// Remove a session from memory and disk.
    ///
    /// Each copy is removed independently; `NotFound` only when neither existed.
    pub async fn delete(&self, session_id: &str) -> Result<DeleteOutcome, DossierError> {
        let not_found = || DossierError::NotFound {
            kind: "session".into(),
            id: session_id.to_string(),
        };
        if !is_valid_session_id(session_id) {
            return Err(not_found());
        }

        let removed_from_memory = match self.sessions.remove(session_id) {
            Some((_, slot)) => {
                let mut guard = slot.lock().await;
                guard.take().is_some()
            }
            None => false,
        };
        let removed_from_disk = self.journal.remove(session_id).await?;

        if !removed_from_memory && !removed_from_disk {
            return Err(not_found());
        }
        info!(session_id, removed_from_memory, removed_from_disk, "session deleted");
        Ok(DeleteOutcome {
            removed_from_memory,
            removed_from_disk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> CallerInfo {
        CallerInfo::new("192.0.2.10", "Mozilla/5.0 (test)")
    }

    #[tokio::test]
    async fn record_numbers_turns_contiguously() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        let sid = ledger.session_id_for(&caller());

        for i in 0..5 {
            ledger
                .record(&sid, &caller(), &format!("q{i}"), &format!("a{i}"))
                .await
                .unwrap();
        }

        let session = ledger.get(sid.as_str()).await.unwrap().unwrap();
        assert_eq!(session.turns.len(), 5);
        assert_eq!(session.total_messages, 5);
        let numbers: Vec<u32> = session.turns.iter().map(|t| t.turn_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn failed_journal_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        let sid = ledger.session_id_for(&caller());
        ledger.record(&sid, &caller(), "q1", "a1").await.unwrap();

        // A directory in place of the journal file makes every append fail.
        let path = ledger.journal().session_path(sid.as_str());
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(ledger.record(&sid, &caller(), "q2", "a2").await.is_err());
        let session = ledger.get(sid.as_str()).await.unwrap().unwrap();
        assert_eq!(session.turns.len(), 1);
        assert_eq!(session.total_messages, 1);

        std::fs::remove_dir(&path).unwrap();
        let turn = ledger.record(&sid, &caller(), "q3", "a3").await.unwrap();
        assert_eq!(turn.turn_number, 2);
    }

    #[tokio::test]
    async fn lengths_count_characters() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        let sid = ledger.session_id_for(&caller());
        let turn = ledger.record(&sid, &caller(), "héllo", "ok").await.unwrap();
        assert_eq!(turn.message_length, 5);
        assert_eq!(turn.response_length, 2);
    }

    #[tokio::test]
    async fn concurrent_records_do_not_lose_turns() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(ConversationLedger::new(dir.path()));
        let sid = ledger.session_id_for(&caller());

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = Arc::clone(&ledger);
            let sid = sid.clone();
            handles.push(tokio::spawn(async move {
                ledger.record(&sid, &caller(), &format!("q{i}"), "a").await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let session = ledger.get(sid.as_str()).await.unwrap().unwrap();
        let mut numbers: Vec<u32> = session.turns.iter().map(|t| t.turn_number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=20).collect::<Vec<_>>());

        let replayed = ledger.journal().replay(sid.as_str()).await.unwrap().unwrap();
        assert_eq!(replayed.turns.len(), 20);
    }

    #[tokio::test]
    async fn restart_hydrates_same_day_session() {
        let dir = tempfile::tempdir().unwrap();
        let sid = {
            let ledger = ConversationLedger::new(dir.path());
            let sid = ledger.session_id_for(&caller());
            ledger.record(&sid, &caller(), "first", "one").await.unwrap();
            ledger.record(&sid, &caller(), "second", "two").await.unwrap();
            sid
        };

        let ledger = ConversationLedger::new(dir.path());
        assert!(ledger.list().await.is_empty());
        let turn = ledger.record(&sid, &caller(), "third", "three").await.unwrap();
        assert_eq!(turn.turn_number, 3);

        let content = std::fs::read_to_string(ledger.journal().session_path(sid.as_str())).unwrap();
        assert_eq!(content.lines().count(), 4, "one header and three turns");
    }

    #[tokio::test]
    async fn get_falls_back_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let sid = {
            let ledger = ConversationLedger::new(dir.path());
            let sid = ledger.session_id_for(&caller());
            ledger.record(&sid, &caller(), "q", "a").await.unwrap();
            sid
        };
        let fresh = ConversationLedger::new(dir.path());
        let session = fresh.get(sid.as_str()).await.unwrap().unwrap();
        assert_eq!(session.ip_address, "192.0.2.10");
        assert_eq!(session.turns.len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_and_malformed_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        assert!(ledger.get("0123456789abcdef").await.unwrap().is_none());
        assert!(ledger.get("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_then_get_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        let sid = ledger.session_id_for(&caller());
        ledger.record(&sid, &caller(), "q", "a").await.unwrap();

        let outcome = ledger.delete(sid.as_str()).await.unwrap();
        assert!(outcome.removed_from_memory);
        assert!(outcome.removed_from_disk);
        assert!(ledger.get(sid.as_str()).await.unwrap().is_none());

        let again = ledger.delete(sid.as_str()).await.unwrap_err();
        assert!(again.is_not_found());
    }

    #[tokio::test]
    async fn delete_disk_only_session() {
        let dir = tempfile::tempdir().unwrap();
        let sid = {
            let ledger = ConversationLedger::new(dir.path());
            let sid = ledger.session_id_for(&caller());
            ledger.record(&sid, &caller(), "q", "a").await.unwrap();
            sid
        };
        let fresh = ConversationLedger::new(dir.path());
        let outcome = fresh.delete(sid.as_str()).await.unwrap();
        assert!(!outcome.removed_from_memory);
        assert!(outcome.removed_from_disk);
    }

    #[tokio::test]
    async fn export_bundles_memory_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        let a = CallerInfo::new("192.0.2.1", "ua-a");
        let b = CallerInfo::new("192.0.2.2", "ua-b");
        ledger.record(&ledger.session_id_for(&a), &a, "q", "a").await.unwrap();
        ledger.record(&ledger.session_id_for(&b), &b, "q1", "a1").await.unwrap();
        ledger.record(&ledger.session_id_for(&b), &b, "q2", "a2").await.unwrap();

        let outcome = ledger.export_all().await.unwrap();
        assert_eq!(outcome.export.total_sessions, 2);
        assert_eq!(outcome.export.total_turns, 3);
        assert!(outcome.file.starts_with(dir.path().join("exports")));

        let written: ConversationExport =
            serde_json::from_slice(&std::fs::read(&outcome.file).unwrap()).unwrap();
        assert_eq!(written.sessions.len(), 2);

        let summaries = ledger.list().await;
        assert_eq!(summaries.len(), 2);
    }

    #[tokio::test]
    async fn record_rejects_malformed_id() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ConversationLedger::new(dir.path());
        let err = ledger
            .record(&SessionId("../x".into()), &caller(), "q", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, DossierError::Internal(_)));
    }
}
