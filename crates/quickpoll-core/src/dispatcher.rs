//! Update dispatcher
//!
//! Classifies inbound events and routes them: commands and free text go to the
//! [`DialogStore`], button presses go to the [`PollRegistry`] and the renderer.
//! Each event is handled to completion, outbound calls included, before
//! `dispatch` returns. Ordering between events of one chat is the caller's
//! responsibility.

use crate::config::PollSettings;
use crate::dialog::{DialogStep, DialogStore, PollDraft};
use crate::error::DispatchError;
use crate::poll::{
    is_vote_routing_id, DisplayedMessage, PollEntry, PollId, PollRecord, PollRegistry,
    PollRenderer, Voter,
};
use crate::transport::{EditOutcome, PollTransport};
use crate::views::{DefaultPollView, PollView};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Commands understood by the bot.
///
/// Transports parse their own command syntax and hand over only the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the welcome message
    Start,
    /// Show usage
    Help,
    /// Start poll creation
    NewPoll,
    /// Abort poll creation
    Cancel,
    /// Show operator counters
    Stats,
    /// Liveness check
    Health,
}

/// A button press on a poll message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    /// Id used to acknowledge the press
    pub interaction_id: String,
    /// Chat of the pressed message
    pub chat_id: i64,
    /// Pressed message
    pub message_id: i32,
    /// User who pressed
    pub user_id: i64,
    /// Display name of the user who pressed
    pub user_name: String,
    /// Callback payload of the button
    pub data: String,
    /// Content the chat currently shows for the message
    pub displayed: DisplayedMessage,
}

/// Inbound event envelope produced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A recognised command
    Command {
        /// Which command
        name: Command,
        /// Command text as typed, used when the command is refused
        text: String,
        /// Originating chat
        chat_id: i64,
        /// Sender
        user_id: i64,
    },
    /// Any other text message
    Text {
        /// Originating chat
        chat_id: i64,
        /// Sender
        user_id: i64,
        /// Message text
        text: String,
    },
    /// A button press
    Callback(CallbackEvent),
}

impl InboundEvent {
    /// A parsed command.
    #[must_use]
    pub fn command(name: Command, chat_id: i64, user_id: i64, text: impl Into<String>) -> Self {
        Self::Command {
            name,
            text: text.into(),
            chat_id,
            user_id,
        }
    }

    /// A free-text message.
    #[must_use]
    pub fn text(chat_id: i64, user_id: i64, text: impl Into<String>) -> Self {
        Self::Text {
            chat_id,
            user_id,
            text: text.into(),
        }
    }
}

/// Counters describing dispatcher activity.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    polls_created: AtomicU64,
    polls_recovered: AtomicU64,
    votes_accepted: AtomicU64,
    duplicate_votes: AtomicU64,
    edits_skipped: AtomicU64,
    transport_failures: AtomicU64,
}

/// Point-in-time copy of [`DispatchMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Polls published through the dialog
    pub polls_created: u64,
    /// Polls rebuilt from displayed content
    pub polls_recovered: u64,
    /// Votes added to a poll
    pub votes_accepted: u64,
    /// Repeated presses ignored
    pub duplicate_votes: u64,
    /// Edits skipped because the display was already current
    pub edits_skipped: u64,
    /// Failed outbound calls
    pub transport_failures: u64,
}

impl DispatchMetrics {
    /// Copy the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            polls_created: self.polls_created.load(Ordering::Relaxed),
            polls_recovered: self.polls_recovered.load(Ordering::Relaxed),
            votes_accepted: self.votes_accepted.load(Ordering::Relaxed),
            duplicate_votes: self.duplicate_votes.load(Ordering::Relaxed),
            edits_skipped: self.edits_skipped.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Routes inbound events to the dialog store or the poll registry.
pub struct UpdateDispatcher<T> {
    transport: T,
    registry: Arc<PollRegistry>,
    dialogs: Arc<DialogStore>,
    renderer: PollRenderer,
    duplicate_vote_notice: bool,
    operators: HashSet<i64>,
    metrics: DispatchMetrics,
}

impl<T: PollTransport> UpdateDispatcher<T> {
    /// Create a dispatcher with empty stores.
    #[must_use]
    pub fn new(transport: T, settings: &PollSettings) -> Self {
        Self::with_stores(
            transport,
            settings,
            Arc::new(PollRegistry::new()),
            Arc::new(DialogStore::new()),
        )
    }

    /// Create a dispatcher over existing stores.
    #[must_use]
    pub fn with_stores(
        transport: T,
        settings: &PollSettings,
        registry: Arc<PollRegistry>,
        dialogs: Arc<DialogStore>,
    ) -> Self {
        Self {
            transport,
            registry,
            dialogs,
            renderer: PollRenderer::new(settings.tally_style),
            duplicate_vote_notice: settings.duplicate_vote_notice,
            operators: settings.operator_ids(),
            metrics: DispatchMetrics::default(),
        }
    }

    /// The poll registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<PollRegistry> {
        &self.registry
    }

    /// The dialog store.
    #[must_use]
    pub const fn dialogs(&self) -> &Arc<DialogStore> {
        &self.dialogs
    }

    /// Activity counters.
    #[must_use]
    pub const fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Handle one inbound event to completion.
    ///
    /// # Errors
    ///
    /// Returns a `DispatchError` if an outbound call the event depends on
    /// fails. State changes made before the failure are kept.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<(), DispatchError> {
        let result = match event {
            InboundEvent::Command {
                name: Command::Stats,
                text,
                chat_id,
                user_id,
            } if !self.operators.contains(&user_id) => {
                debug!(user_id, chat_id, "Stats refused to non-operator");
                self.handle_text(chat_id, user_id, &text).await
            }
            InboundEvent::Command {
                name,
                chat_id,
                user_id,
                ..
            } => self.handle_command(name, chat_id, user_id).await,
            InboundEvent::Text {
                chat_id,
                user_id,
                text,
            } => self.handle_text(chat_id, user_id, &text).await,
            InboundEvent::Callback(event) => self.handle_callback(event).await,
        };

        if result.is_err() {
            DispatchMetrics::bump(&self.metrics.transport_failures);
        }
        result
    }

    async fn handle_command(
        &self,
        command: Command,
        chat_id: i64,
        user_id: i64,
    ) -> Result<(), DispatchError> {
        info!(user_id, chat_id, ?command, "Command received");

        let reply = match command {
            Command::Start | Command::Help => DefaultPollView::welcome_message().to_string(),
            Command::Health => DefaultPollView::health_message().to_string(),
            Command::NewPoll => match self.dialogs.start(user_id).await {
                DialogStep::Started { restarted: true } => {
                    DefaultPollView::question_prompt_restarted().to_string()
                }
                _ => DefaultPollView::question_prompt().to_string(),
            },
            Command::Cancel => match self.dialogs.cancel(user_id).await {
                DialogStep::Cancelled => DefaultPollView::dialog_cancelled().to_string(),
                _ => DefaultPollView::nothing_to_cancel().to_string(),
            },
            Command::Stats => DefaultPollView::stats_message(
                &self.metrics.snapshot(),
                self.registry.len().await,
                self.dialogs.active_dialogs().await,
            ),
        };

        self.transport.send_message(chat_id, &reply, None).await?;
        Ok(())
    }

    async fn handle_text(
        &self,
        chat_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<(), DispatchError> {
        let reply = match self.dialogs.accept_text(user_id, text).await {
            DialogStep::Ignored => {
                debug!(user_id, chat_id, "Text outside a dialog ignored");
                return Ok(());
            }
            DialogStep::QuestionAccepted => DefaultPollView::button_label_prompt(),
            DialogStep::EmptyInput(stage) => DefaultPollView::empty_input(stage),
            DialogStep::Completed(draft) => return self.publish_poll(chat_id, user_id, draft).await,
            // Commands only; text never starts or cancels a dialog.
            DialogStep::Started { .. } | DialogStep::Cancelled | DialogStep::NothingToCancel => {
                return Ok(())
            }
        };

        self.transport.send_message(chat_id, reply, None).await?;
        Ok(())
    }

    async fn publish_poll(
        &self,
        chat_id: i64,
        user_id: i64,
        draft: PollDraft,
    ) -> Result<(), DispatchError> {
        let record = PollRegistry::create_poll(draft.question, draft.button_label);
        let rendered = self.renderer.render(&record);

        let message_id = self
            .transport
            .send_message(chat_id, &rendered.text, Some(rendered.button.clone()))
            .await?;

        let poll_id = PollId::new(chat_id, message_id);
        self.registry.register(poll_id, record, rendered).await;
        DispatchMetrics::bump(&self.metrics.polls_created);
        info!(poll_id = %poll_id, user_id, "Poll published");
        Ok(())
    }

    async fn handle_callback(&self, event: CallbackEvent) -> Result<(), DispatchError> {
        if !is_vote_routing_id(&event.data) {
            debug!(data = %event.data, "Callback without poll routing id");
            self.acknowledge(&event.interaction_id, None).await;
            return Ok(());
        }

        let poll_id = PollId::new(event.chat_id, event.message_id);
        let (entry, recovered) = self
            .registry
            .entry_or_recover(poll_id, || {
                PollEntry::recovered(
                    PollRecord::recover(&event.displayed, &event.data),
                    event.displayed.text.clone(),
                )
            })
            .await;
        if recovered {
            DispatchMetrics::bump(&self.metrics.polls_recovered);
            warn!(poll_id = %poll_id, "Poll state missing, recovered from displayed message");
        }

        let outcome = entry
            .apply_vote(Voter::new(event.user_id, event.user_name.clone()))
            .await;

        let notice = (!outcome.accepted && self.duplicate_vote_notice)
            .then(|| DefaultPollView::already_voted().to_string());
        self.acknowledge(&event.interaction_id, notice).await;

        if !outcome.accepted {
            DispatchMetrics::bump(&self.metrics.duplicate_votes);
            debug!(poll_id = %poll_id, user_id = event.user_id, "Duplicate vote ignored");
            return Ok(());
        }
        DispatchMetrics::bump(&self.metrics.votes_accepted);
        info!(poll_id = %poll_id, user_id = event.user_id, tally = outcome.tally, "Vote accepted");

        // Held until the edit lands; each holder renders the latest record, so
        // a slower edit never puts an older tally back on screen.
        let mut display = entry.display().await;
        let rendered = self.renderer.render(&entry.record().await);
        if display.is_current(&rendered) {
            DispatchMetrics::bump(&self.metrics.edits_skipped);
            debug!(poll_id = %poll_id, "Display already current, edit skipped");
            return Ok(());
        }

        let edit = self
            .transport
            .edit_message_text(
                event.chat_id,
                event.message_id,
                &rendered.text,
                Some(rendered.button.clone()),
            )
            .await?;
        if edit == EditOutcome::Unchanged {
            debug!(poll_id = %poll_id, "Transport reported content unchanged");
        }
        display.mark(rendered);
        Ok(())
    }

    /// Acknowledge a press. Failure is counted and logged but does not stop the vote flow.
    async fn acknowledge(&self, interaction_id: &str, notice: Option<String>) {
        if let Err(e) = self
            .transport
            .acknowledge_interaction(interaction_id, notice)
            .await
        {
            DispatchMetrics::bump(&self.metrics.transport_failures);
            warn!(error = %e, "Failed to acknowledge interaction");
        }
    }
}
