// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session bookkeeping for the Dossier chat backend.
//!
//! [`ConversationLedger`] assigns each caller a per-day pseudo-session and
//! appends every turn to memory and to a JSONL journal. [`AnalyticsStore`]
//! keeps process-lifetime visitor counters.

pub mod analytics;
pub mod journal;
pub mod ledger;
pub mod session;
pub mod types;

pub use analytics::{AnalyticsSnapshot, AnalyticsStore, ChatEvent, VisitKind, VisitorEvent};
pub use journal::Journal;
pub use ledger::ConversationLedger;
pub use session::{CallerInfo, is_valid_session_id, session_of};
pub use types::{
    ConversationExport, ConversationSession, ConversationTurn, DeleteOutcome, ExportOutcome,
    JournalRecord, SessionSummary,
};
