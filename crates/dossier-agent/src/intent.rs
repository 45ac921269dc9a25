// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational intent detection ahead of retrieval.
//!
//! Patterns match whole words: "hi" matches "hi there" but not "this".
//! No pattern of one category occurs inside a pattern of another, so at most
//! one category can claim a pattern-only message.

use serde::Serialize;
use strum::{Display, EnumIter};

/// A conversational intent answered with a canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Thanks,
    Goodbye,
    Help,
    Identity,
}

impl Intent {
    /// Phrase patterns for this category, already normalized.
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            Intent::Greeting => &[
                "hello",
                "hi",
                "hey",
                "howdy",
                "greetings",
                "good morning",
                "good afternoon",
                "good evening",
            ],
            Intent::Thanks => &[
                "thanks",
                "thank you",
                "thx",
                "appreciate it",
                "much appreciated",
            ],
            Intent::Goodbye => &[
                "bye",
                "goodbye",
                "see you",
                "farewell",
                "talk later",
                "have a good day",
            ],
            Intent::Help => &[
                "help",
                "what can you do",
                "what can i ask",
                "how does this work",
                "what do you know",
            ],
            Intent::Identity => &[
                "who are you",
                "what are you",
                "are you a bot",
                "are you real",
                "are you ai",
                "are you human",
                "how were you built",
                "how do you work",
            ],
        }
    }
}

/// Categories in the order they are tried.
const CHECK_ORDER: [Intent; 5] = [
    Intent::Greeting,
    Intent::Thanks,
    Intent::Goodbye,
    Intent::Help,
    Intent::Identity,
];

/// Lowercase, turn every non-alphanumeric run into one space, and pad with
/// spaces so phrase matching can test word boundaries with `contains`.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if !out.ends_with(' ') {
        out.push(' ');
    }
    out
}

/// The first intent whose patterns occur in `message`, if any.
pub fn detect_intent(message: &str) -> Option<Intent> {
    let normalized = normalize(message);
    CHECK_ORDER.into_iter().find(|intent| {
        intent
            .patterns()
            .iter()
            .any(|p| normalized.contains(&format!(" {p} ")))
    })
}
