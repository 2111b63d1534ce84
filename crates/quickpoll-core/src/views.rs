//! User-facing texts
//!
//! Every string the dispatcher sends lives behind [`PollView`] so a deployment
//! can swap wording without touching the handlers.

use crate::dialog::DialogStage;
use crate::dispatcher::MetricsSnapshot;

/// Texts shown to users.
pub trait PollView {
    /// Usage message for `/start` and `/help`
    fn welcome_message() -> &'static str;

    /// Prompt for the poll question
    fn question_prompt() -> &'static str;

    /// Prompt for the poll question after discarding an unfinished dialog
    fn question_prompt_restarted() -> &'static str;

    /// Prompt for the button label
    fn button_label_prompt() -> &'static str;

    /// Re-prompt after blank input
    fn empty_input(stage: DialogStage) -> &'static str;

    /// Dialog cancelled
    fn dialog_cancelled() -> &'static str;

    /// Cancel without a dialog in progress
    fn nothing_to_cancel() -> &'static str;

    /// Private notice for a repeated button press
    fn already_voted() -> &'static str;

    /// Liveness reply for `/health`
    fn health_message() -> &'static str;

    /// Operator statistics
    fn stats_message(stats: &MetricsSnapshot, polls: usize, dialogs: usize) -> String;
}

/// Default English texts.
pub struct DefaultPollView;

impl PollView for DefaultPollView {
    fn welcome_message() -> &'static str {
        "👋 I run single-button polls.\n\n\
         /newpoll - create a poll\n\
         /cancel - abort poll creation\n\
         /health - check the bot is alive"
    }

    fn question_prompt() -> &'static str {
        "What is the poll question?"
    }

    fn question_prompt_restarted() -> &'static str {
        "Previous draft discarded. What is the poll question?"
    }

    fn button_label_prompt() -> &'static str {
        "What should the vote button say?"
    }

    fn empty_input(stage: DialogStage) -> &'static str {
        match stage {
            DialogStage::AwaitingButtonLabel => "The button label cannot be empty. Try again.",
            DialogStage::AwaitingQuestion | DialogStage::Idle => {
                "The question cannot be empty. Try again."
            }
        }
    }

    fn dialog_cancelled() -> &'static str {
        "Poll creation cancelled."
    }

    fn nothing_to_cancel() -> &'static str {
        "Nothing to cancel."
    }

    fn already_voted() -> &'static str {
        "You already voted."
    }

    fn health_message() -> &'static str {
        "Bot alive"
    }

    fn stats_message(stats: &MetricsSnapshot, polls: usize, dialogs: usize) -> String {
        format!(
            "📊 Poll statistics\n\n\
             • Polls in memory: {polls}\n\
             • Dialogs in progress: {dialogs}\n\
             • Polls created: {}\n\
             • Polls recovered: {}\n\
             • Votes accepted: {}\n\
             • Duplicate votes: {}\n\
             • Edits skipped: {}\n\
             • Transport failures: {}",
            stats.polls_created,
            stats.polls_recovered,
            stats.votes_accepted,
            stats.duplicate_votes,
            stats.edits_skipped,
            stats.transport_failures,
        )
    }
}
