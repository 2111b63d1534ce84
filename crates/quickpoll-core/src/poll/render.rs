//! Poll rendering
//!
//! Turns a [`PollRecord`] into the text and button a chat displays. Rendering
//! is pure: equal records always produce byte-identical output, which lets the
//! dispatcher skip edits that would not change anything.

use serde::{Deserialize, Serialize};

use super::record::PollRecord;

/// Separator between the question and the tally summary.
pub const SUMMARY_SEPARATOR: &str = "\n\n";
/// Leading text of the tally summary line.
pub const TALLY_PREFIX: &str = "🗳 Votes: ";
/// Most voter names listed under the tally; the rest are summarised.
///
/// Keeps a names-style poll well inside Telegram's 4096 character limit.
pub const MAX_LISTED_VOTERS: usize = 50;
/// Longest voter name shown in full.
const MAX_NAME_CHARS: usize = 40;

/// How the tally summary is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TallyStyle {
    /// Only the number of voters
    #[default]
    Count,
    /// The number of voters followed by their names
    Names,
}

/// The single inline button attached to a poll message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollButton {
    /// Visible label
    pub label: String,
    /// Callback payload sent back when pressed
    pub routing_id: String,
}

impl PollButton {
    /// Create a button.
    #[must_use]
    pub fn new(label: impl Into<String>, routing_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            routing_id: routing_id.into(),
        }
    }
}

/// Output of [`PollRenderer::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPoll {
    /// Message text
    pub text: String,
    /// Vote button
    pub button: PollButton,
}

/// Content a chat currently shows for a poll message, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayedMessage {
    /// Visible message text
    pub text: String,
    /// Label of the first inline button, if any
    pub button_label: Option<String>,
}

/// Renders poll records according to a [`TallyStyle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PollRenderer {
    style: TallyStyle,
}

impl PollRenderer {
    /// Create a renderer with the given tally style.
    #[must_use]
    pub const fn new(style: TallyStyle) -> Self {
        Self { style }
    }

    /// Configured tally style.
    #[must_use]
    pub const fn style(&self) -> TallyStyle {
        self.style
    }

    /// Render a poll into message text and its vote button.
    #[must_use]
    pub fn render(&self, record: &PollRecord) -> RenderedPoll {
        let mut text = format!(
            "{}{SUMMARY_SEPARATOR}{TALLY_PREFIX}{}",
            record.question(),
            record.tally()
        );

        if self.style == TallyStyle::Names {
            for voter in record.voters().iter().take(MAX_LISTED_VOTERS) {
                text.push_str("\n• ");
                if voter.display_name.trim().is_empty() {
                    text.push_str(&format!("user {}", voter.user_id));
                } else if voter.display_name.chars().count() > MAX_NAME_CHARS {
                    let name: String = voter.display_name.chars().take(MAX_NAME_CHARS).collect();
                    text.push_str(&name);
                    text.push('…');
                } else {
                    text.push_str(&voter.display_name);
                }
            }
            let hidden = record.tally().saturating_sub(MAX_LISTED_VOTERS);
            if hidden > 0 {
                text.push_str(&format!("\n…and {hidden} more"));
            }
        }

        RenderedPoll {
            text,
            button: PollButton::new(record.button_label(), record.routing_id()),
        }
    }
}

/// Extract the question from rendered poll text.
///
/// Text that carries no tally summary is returned unchanged.
#[must_use]
pub fn recover_question(text: &str) -> &str {
    let marker = format!("{SUMMARY_SEPARATOR}{TALLY_PREFIX}");
    text.rfind(&marker).map_or(text, |idx| &text[..idx])
}
