use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::render::{recover_question, DisplayedMessage};

/// Prefix carried by every poll button's callback payload.
pub const VOTE_ROUTING_PREFIX: &str = "vote:";

/// Label used when a poll is recovered from a message without a readable button.
pub const FALLBACK_BUTTON_LABEL: &str = "Vote";

/// Identifier of a published poll: the chat and the message that shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PollId {
    /// Chat the poll was published in
    pub chat_id: i64,
    /// Message carrying the poll
    pub message_id: i32,
}

impl PollId {
    /// Create a poll id from its chat and message.
    #[must_use]
    pub const fn new(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.message_id)
    }
}

/// A participant who pressed the poll button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Transport user id
    pub user_id: i64,
    /// Name shown when the tally lists voters
    pub display_name: String,
}

impl Voter {
    /// Create a voter.
    #[must_use]
    pub fn new(user_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// Authoritative state of one published poll.
///
/// Voters are kept in vote order and a user id appears at most once. The list
/// only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRecord {
    question: String,
    button_label: String,
    routing_id: String,
    voters: Vec<Voter>,
    created_at: DateTime<Utc>,
}

impl PollRecord {
    /// Allocate a fresh poll with no voters and a new routing id.
    #[must_use]
    pub fn new(question: impl Into<String>, button_label: impl Into<String>) -> Self {
        let routing_id = format!("{VOTE_ROUTING_PREFIX}{}", Uuid::new_v4().simple());
        Self::with_routing_id(question, button_label, routing_id)
    }

    /// Allocate a poll bound to an existing routing id.
    #[must_use]
    pub fn with_routing_id(
        question: impl Into<String>,
        button_label: impl Into<String>,
        routing_id: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            button_label: button_label.into(),
            routing_id: routing_id.into(),
            voters: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a poll from the content a chat currently displays.
    ///
    /// Previous voters are unknown at this point, so the record starts empty.
    #[must_use]
    pub fn recover(displayed: &DisplayedMessage, routing_id: &str) -> Self {
        let button_label = displayed
            .button_label
            .clone()
            .unwrap_or_else(|| FALLBACK_BUTTON_LABEL.to_string());
        Self::with_routing_id(
            recover_question(&displayed.text),
            button_label,
            routing_id,
        )
    }

    /// The poll question.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The label of the single vote button.
    #[must_use]
    pub fn button_label(&self) -> &str {
        &self.button_label
    }

    /// Callback payload routing button presses back to this poll.
    #[must_use]
    pub fn routing_id(&self) -> &str {
        &self.routing_id
    }

    /// Voters in the order their votes were accepted.
    #[must_use]
    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of distinct voters.
    #[must_use]
    pub fn tally(&self) -> usize {
        self.voters.len()
    }

    /// Whether this user already voted.
    #[must_use]
    pub fn has_voted(&self, user_id: i64) -> bool {
        self.voters.iter().any(|v| v.user_id == user_id)
    }

    /// Insert a voter unless already present. Returns `true` on insertion.
    pub(crate) fn add_voter(&mut self, voter: Voter) -> bool {
        if self.has_voted(voter.user_id) {
            return false;
        }
        self.voters.push(voter);
        true
    }
}

/// Whether a callback payload belongs to a poll button.
#[must_use]
pub fn is_vote_routing_id(data: &str) -> bool {
    data.starts_with(VOTE_ROUTING_PREFIX)
}
