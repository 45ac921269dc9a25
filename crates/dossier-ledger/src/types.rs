// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation records and their durable encoding.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dossier_core::SessionId;
use serde::{Deserialize, Serialize};

/// One user-message/bot-response pair. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// 1-based, contiguous within a session.
    pub turn_number: u32,
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_response: String,
    /// Length of `user_message` in characters.
    pub message_length: usize,
    /// Length of `bot_response` in characters.
    pub response_length: usize,
}

/// All turns from one inferred caller on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub turns: Vec<ConversationTurn>,
    pub total_messages: usize,
}

impl ConversationSession {
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            start_time: self.start_time,
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
            total_messages: self.total_messages,
            last_activity: self.turns.last().map(|t| t.timestamp),
        }
    }
}

/// Listing view of a session without its turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub start_time: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub total_messages: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Every in-memory session as of one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationExport {
    pub export_timestamp: DateTime<Utc>,
    pub total_sessions: usize,
    pub total_turns: usize,
    pub sessions: Vec<ConversationSession>,
}

/// An export plus where it was written.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub file: PathBuf,
    #[serde(flatten)]
    pub export: ConversationExport,
}

/// Which copies of a session a delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub removed_from_memory: bool,
    pub removed_from_disk: bool,
}

/// One line of a session journal file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum JournalRecord {
    /// First line of every journal.
    Started {
        session_id: SessionId,
        start_time: DateTime<Utc>,
        ip_address: String,
        user_agent: String,
    },
    Turn(ConversationTurn),
}
