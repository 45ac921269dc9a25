// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-and-response engine for the Dossier chat backend.
//!
//! [`ChatEngine::handle`] runs one message through the pipeline:
//! availability check, [`intent`] pre-filter, retrieval, [`composer`], and
//! finally the conversation ledger, which records every outcome.

pub mod composer;
pub mod engine;
pub mod intent;
pub mod replies;

pub use composer::{ChatReply, ReplyOutcome, ResponseComposer, lexical_context, semantic_context};
pub use engine::ChatEngine;
pub use intent::{Intent, detect_intent};
pub use replies::CannedReplies;
