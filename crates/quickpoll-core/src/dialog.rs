//! Poll creation dialog
//!
//! Each user walks through `Idle -> AwaitingQuestion -> AwaitingButtonLabel ->
//! Idle`. The state machine itself is synchronous; [`DialogStore`] keeps one
//! state per user behind a lock and hands the resulting [`DialogStep`] back to
//! the dispatcher, which performs the outbound calls.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Stage of a user's dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogStage {
    /// No dialog in progress
    #[default]
    Idle,
    /// Waiting for the poll question
    AwaitingQuestion,
    /// Waiting for the button label
    AwaitingButtonLabel,
}

/// Inputs collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Poll question
    pub question: Option<String>,
    /// Vote button label
    pub button_label: Option<String>,
}

impl Draft {
    /// Complete draft, or `None` while an input is still missing.
    #[must_use]
    pub fn into_poll(self) -> Option<PollDraft> {
        Some(PollDraft {
            question: self.question?,
            button_label: self.button_label?,
        })
    }
}

/// Inputs of a finished dialog, ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    /// Poll question
    pub question: String,
    /// Vote button label
    pub button_label: String,
}

/// What a dialog input did, and therefore what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogStep {
    /// Dialog (re)started; ask for the question
    Started {
        /// A previous unfinished dialog was discarded
        restarted: bool,
    },
    /// Question stored; ask for the button label
    QuestionAccepted,
    /// Both inputs collected; publish the poll
    Completed(PollDraft),
    /// Blank input; ask again for the same field
    EmptyInput(DialogStage),
    /// Dialog cancelled and draft discarded
    Cancelled,
    /// Cancel requested with no dialog in progress
    NothingToCancel,
    /// Free text outside a dialog
    Ignored,
}

/// Dialog state of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogState {
    /// Current stage
    pub stage: DialogStage,
    /// Collected inputs
    pub draft: Draft,
}

impl DialogState {
    /// Handle the entry command. An unfinished dialog is overwritten.
    pub fn start(&mut self) -> DialogStep {
        let restarted = self.stage != DialogStage::Idle;
        *self = Self {
            stage: DialogStage::AwaitingQuestion,
            draft: Draft::default(),
        };
        DialogStep::Started { restarted }
    }

    /// Handle the cancellation command.
    pub fn cancel(&mut self) -> DialogStep {
        if self.stage == DialogStage::Idle {
            return DialogStep::NothingToCancel;
        }
        *self = Self::default();
        DialogStep::Cancelled
    }

    /// Handle a free-text message.
    pub fn accept_text(&mut self, text: &str) -> DialogStep {
        let text = text.trim();
        if self.stage != DialogStage::Idle && text.is_empty() {
            return DialogStep::EmptyInput(self.stage);
        }

        match self.stage {
            DialogStage::Idle => DialogStep::Ignored,
            DialogStage::AwaitingQuestion => {
                self.draft.question = Some(text.to_string());
                self.stage = DialogStage::AwaitingButtonLabel;
                DialogStep::QuestionAccepted
            }
            DialogStage::AwaitingButtonLabel => {
                self.draft.button_label = Some(text.to_string());
                let draft = std::mem::take(&mut self.draft);
                self.stage = DialogStage::Idle;
                // A draft without a question never reaches this stage through `start`.
                draft.into_poll().map_or(DialogStep::Ignored, DialogStep::Completed)
            }
        }
    }
}

/// Per-user dialog states.
///
/// Idle users have no entry; an abandoned dialog stays until the user starts
/// over, cancels, or the process exits.
#[derive(Debug, Default)]
pub struct DialogStore {
    states: RwLock<HashMap<i64, DialogState>>,
}

impl DialogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the dialog of a user.
    pub async fn start(&self, user_id: i64) -> DialogStep {
        self.transition(user_id, DialogState::start).await
    }

    /// Cancel the dialog of a user.
    pub async fn cancel(&self, user_id: i64) -> DialogStep {
        self.transition(user_id, DialogState::cancel).await
    }

    /// Feed free text into the dialog of a user.
    pub async fn accept_text(&self, user_id: i64, text: &str) -> DialogStep {
        self.transition(user_id, |state| state.accept_text(text)).await
    }

    /// Current state of a user (Idle when unknown).
    pub async fn state(&self, user_id: i64) -> DialogState {
        let states = self.states.read().await;
        states.get(&user_id).cloned().unwrap_or_default()
    }

    /// Number of users with a dialog in progress.
    pub async fn active_dialogs(&self) -> usize {
        self.states.read().await.len()
    }

    async fn transition<F>(&self, user_id: i64, f: F) -> DialogStep
    where
        F: FnOnce(&mut DialogState) -> DialogStep,
    {
        let mut states = self.states.write().await;
        let mut state = states.remove(&user_id).unwrap_or_default();
        let step = f(&mut state);
        debug!(user_id, stage = ?state.stage, step = ?step, "Dialog transition");
        if state.stage != DialogStage::Idle {
            states.insert(user_id, state);
        }
        step
    }
}
