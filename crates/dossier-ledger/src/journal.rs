// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only JSONL files, one per session, plus export snapshots.
//!
//! Layout under the logs directory:
//! - `<session_id>.jsonl`: a `started` record, then one `turn` record per line.
//! - `exports/conversations_export_<YYYYmmdd_HHMMSS>.json`.

use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use dossier_core::{DossierError, SessionId};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

use crate::session::UNKNOWN;
use crate::types::{ConversationExport, ConversationSession, JournalRecord};

const EXPORT_DIR: &str = "exports";

/// Durable per-session storage.
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.jsonl"))
    }

    /// Append one record as a single line, creating the file if needed.
    ///
    /// A torn final line left by an interrupted write is terminated first so
    /// the new record starts on its own line.
    pub async fn append(&self, session_id: &str, record: &JournalRecord) -> Result<(), DossierError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(DossierError::storage)?;

        let record = serde_json::to_string(record).map_err(DossierError::storage)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.session_path(session_id))
            .await
            .map_err(DossierError::storage)?;

        let mut line = String::with_capacity(record.len() + 2);
        if ends_mid_line(&mut file).await.map_err(DossierError::storage)? {
            warn!(session_id, "terminating torn journal line before append");
            line.push('\n');
        }
        line.push_str(&record);
        line.push('\n');

        file.write_all(line.as_bytes())
            .await
            .map_err(DossierError::storage)?;
        file.flush().await.map_err(DossierError::storage)?;
        Ok(())
    }

    /// Rebuild a session from its journal. `None` when no journal exists.
    ///
    /// Unparseable lines (e.g. a torn final write) are skipped with a warning.
    pub async fn replay(&self, session_id: &str) -> Result<Option<ConversationSession>, DossierError> {
        let path = self.session_path(session_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DossierError::storage(e)),
        };

        let mut session: Option<ConversationSession> = None;
        let mut turns = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(trimmed) {
                Ok(JournalRecord::Started {
                    session_id,
                    start_time,
                    ip_address,
                    user_agent,
                }) => {
                    session.get_or_insert(ConversationSession {
                        session_id,
                        start_time,
                        ip_address,
                        user_agent,
                        turns: Vec::new(),
                        total_messages: 0,
                    });
                }
                Ok(JournalRecord::Turn(turn)) => turns.push(turn),
                Err(e) => {
                    warn!(path = %path.display(), line = index + 1, error = %e, "skipping unreadable journal line");
                }
            }
        }

        if session.is_none() && turns.is_empty() {
            return Ok(None);
        }
        let mut session = session.unwrap_or_else(|| {
            warn!(path = %path.display(), "journal has no header; caller details unknown");
            ConversationSession {
                session_id: SessionId(session_id.to_string()),
                start_time: turns.first().map(|t| t.timestamp).unwrap_or_else(chrono::Utc::now),
                ip_address: UNKNOWN.to_string(),
                user_agent: UNKNOWN.to_string(),
                turns: Vec::new(),
                total_messages: 0,
            }
        });
        session.total_messages = turns.len();
        session.turns = turns;
        Ok(Some(session))
    }

    /// Delete a session journal. Returns whether a file was removed.
    pub async fn remove(&self, session_id: &str) -> Result<bool, DossierError> {
        match tokio::fs::remove_file(self.session_path(session_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DossierError::storage(e)),
        }
    }

    /// Write an export snapshot and return its path.
    pub async fn write_export(&self, export: &ConversationExport) -> Result<PathBuf, DossierError> {
        let dir = self.dir.join(EXPORT_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(DossierError::storage)?;

        let name = format!(
            "conversations_export_{}.json",
            export.export_timestamp.format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(name);
        let body = serde_json::to_vec_pretty(export).map_err(DossierError::storage)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(DossierError::storage)?;
        Ok(path)
    }
}

/// Whether a non-empty file's last byte is something other than a newline.
async fn ends_mid_line(file: &mut tokio::fs::File) -> std::io::Result<bool> {
    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}
