// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pseudo-session identity derived from caller metadata.
//!
//! Grouping only: anyone who can forge the IP and user agent can join a
//! session, so ids must never gate access.

use chrono::NaiveDate;
use dossier_core::SessionId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
const SESSION_ID_LEN: usize = 16;

/// Stand-in for caller metadata that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Caller metadata as seen by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl CallerInfo {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}

/// Deterministic session id for a caller on a calendar day.
pub fn session_of(ip_address: &str, user_agent: &str, day: NaiveDate) -> SessionId {
    let mut hasher = Sha256::new();
    hasher.update(ip_address.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    hasher.update(b"|");
    hasher.update(day.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    SessionId(digest[..SESSION_ID_LEN].to_string())
}

/// Whether `id` has the shape [`session_of`] produces.
///
/// Ids arrive from URL paths and become file names, so anything else is
/// rejected before touching the filesystem.
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == SESSION_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}
