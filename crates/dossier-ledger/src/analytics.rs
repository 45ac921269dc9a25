// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-lifetime visitor analytics.
//!
//! Counters only ever grow; the recent-event lists keep the newest
//! `recent_events_limit` entries. Everything resets on restart.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use dossier_core::SessionId;
use serde::Serialize;

use crate::session::CallerInfo;

/// What brought a visitor in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitKind {
    PageView,
    ResumeDownload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: VisitKind,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEvent {
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    pub ip_address: String,
    pub message_length: usize,
    pub response_length: usize,
}

/// Serializable point-in-time view, newest events first.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub started_at: DateTime<Utc>,
    pub page_views: u64,
    pub chat_interactions: u64,
    pub resume_downloads: u64,
    pub recent_visitors: Vec<VisitorEvent>,
    pub recent_chats: Vec<ChatEvent>,
}

#[derive(Debug, Default)]
struct Counters {
    page_views: u64,
    chat_interactions: u64,
    resume_downloads: u64,
    recent_visitors: VecDeque<VisitorEvent>,
    recent_chats: VecDeque<ChatEvent>,
}

/// Shared analytics state, injected into handlers behind an `Arc`.
#[derive(Debug)]
pub struct AnalyticsStore {
    started_at: DateTime<Utc>,
    limit: usize,
    counters: Mutex<Counters>,
}

fn push_bounded<T>(list: &mut VecDeque<T>, item: T, limit: usize) {
    list.push_back(item);
    while list.len() > limit {
        list.pop_front();
    }
}

impl AnalyticsStore {
    pub fn new(recent_events_limit: usize) -> Self {
        Self {
            started_at: Utc::now(),
            limit: recent_events_limit,
            counters: Mutex::new(Counters::default()),
        }
    }

    fn counters(&self) -> MutexGuard<'_, Counters> {
        // Counters stay meaningful even if a holder panicked mid-update.
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn visit(&self, kind: VisitKind, caller: &CallerInfo) {
        let event = VisitorEvent {
            timestamp: Utc::now(),
            kind,
            ip_address: caller.ip_address.clone(),
            user_agent: caller.user_agent.clone(),
        };
        let mut counters = self.counters();
        match kind {
            VisitKind::PageView => counters.page_views += 1,
            VisitKind::ResumeDownload => counters.resume_downloads += 1,
        }
        push_bounded(&mut counters.recent_visitors, event, self.limit);
    }

    pub fn record_page_view(&self, caller: &CallerInfo) {
        self.visit(VisitKind::PageView, caller);
    }

    pub fn record_resume_download(&self, caller: &CallerInfo) {
        self.visit(VisitKind::ResumeDownload, caller);
    }

    pub fn record_chat(
        &self,
        session_id: &SessionId,
        caller: &CallerInfo,
        message_length: usize,
        response_length: usize,
    ) {
        let event = ChatEvent {
            timestamp: Utc::now(),
            session_id: session_id.clone(),
            ip_address: caller.ip_address.clone(),
            message_length,
            response_length,
        };
        let mut counters = self.counters();
        counters.chat_interactions += 1;
        push_bounded(&mut counters.recent_chats, event, self.limit);
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let counters = self.counters();
        AnalyticsSnapshot {
            started_at: self.started_at,
            page_views: counters.page_views,
            chat_interactions: counters.chat_interactions,
            resume_downloads: counters.resume_downloads,
            recent_visitors: counters.recent_visitors.iter().rev().cloned().collect(),
            recent_chats: counters.recent_chats.iter().rev().cloned().collect(),
        }
    }
}
