// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed replies, rendered once from the `[bot]` section.

use dossier_config::model::BotConfig;

use crate::intent::Intent;

/// Every non-generated reply the assistant can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedReplies {
    pub greeting: String,
    pub thanks: String,
    pub goodbye: String,
    pub help: String,
    pub identity: String,
    pub unavailable: String,
    pub no_match: String,
    pub failure: String,
    pub unreadable_request: String,
}

impl CannedReplies {
    pub fn from_bot(bot: &BotConfig) -> Self {
        let owner = &bot.owner_name;
        let email = &bot.contact_email;
        let linkedin = &bot.linkedin_url;
        let scheduling = &bot.scheduling_url;

        Self {
            greeting: format!(
                "Hi! I'm {owner}'s AI assistant. Ask me about {owner}'s experience, skills, \
                 projects, or background and I'll answer from what {owner} has shared."
            ),
            thanks: format!(
                "You're welcome! To follow up directly, reach {owner} at {email} or on LinkedIn at {linkedin}."
            ),
            goodbye: format!(
                "Thanks for stopping by! If you'd like to talk with {owner}, book a time at {scheduling}."
            ),
            help: format!(
                "I can answer questions about {owner}'s:\n\
                 - current role and responsibilities\n\
                 - work history and past projects\n\
                 - technical skills and tools\n\
                 - education and certifications\n\
                 - availability and how to get in touch\n\n\
                 Try asking \"What is your current role?\""
            ),
            identity: format!(
                "I'm an AI assistant that answers questions about {owner}. I look up your question \
                 in a set of answers {owner} wrote, then a language model phrases a reply from that \
                 material. For anything I can't answer, contact {owner} at {email}."
            ),
            unavailable: format!(
                "AI assistant is currently unavailable. Please contact {owner} directly at {email}"
            ),
            no_match: format!(
                "I don't have specific information about that. Please contact {owner} directly at \
                 {email} or connect on LinkedIn at {linkedin}"
            ),
            failure: format!(
                "I'm experiencing technical difficulties. Please contact {owner} directly at {email}"
            ),
            unreadable_request: "I couldn't read that message. Please send JSON like \
                                 {\"message\": \"your question\"}."
                .to_string(),
        }
    }

    pub fn for_intent(&self, intent: Intent) -> &str {
        match intent {
            Intent::Greeting => &self.greeting,
            Intent::Thanks => &self.thanks,
            Intent::Goodbye => &self.goodbye,
            Intent::Help => &self.help,
            Intent::Identity => &self.identity,
        }
    }
}
