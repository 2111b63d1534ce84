//! Poll registry
//!
//! Owns every published poll for the lifetime of the process. The map itself
//! sits behind a `RwLock` so inserting a new poll never races with lookups.
//! Each poll carries two locks: a short one around the record, taken once per
//! vote, and one around the displayed output, held by whoever is editing the
//! poll message. Votes therefore never wait for an edit in flight, while edits
//! of one poll still go out one at a time.

use super::record::{PollId, PollRecord, Voter};
use super::render::{PollButton, RenderedPoll};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

/// Result of applying one vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// `true` when the voter was added, `false` for a repeat press
    pub accepted: bool,
    /// Distinct voters after the call
    pub tally: usize,
}

/// Output last known to be on screen for a poll.
#[derive(Debug, Default)]
pub struct DisplayState {
    current: Option<RenderedPoll>,
}

impl DisplayState {
    /// Whether `rendered` equals what the chat already shows.
    #[must_use]
    pub fn is_current(&self, rendered: &RenderedPoll) -> bool {
        self.current.as_ref() == Some(rendered)
    }

    /// Remember `rendered` as the content on screen.
    pub fn mark(&mut self, rendered: RenderedPoll) {
        self.current = Some(rendered);
    }
}

/// A registered poll together with the output last known to be on screen.
#[derive(Debug)]
pub struct PollEntry {
    record: Mutex<PollRecord>,
    display: Mutex<DisplayState>,
}

impl PollEntry {
    /// Wrap a record whose rendered form is currently displayed.
    #[must_use]
    pub fn new(record: PollRecord, displayed: Option<RenderedPoll>) -> Self {
        Self {
            record: Mutex::new(record),
            display: Mutex::new(DisplayState { current: displayed }),
        }
    }

    /// Rebuild an entry from a recovered record and the text the chat shows.
    #[must_use]
    pub fn recovered(record: PollRecord, displayed_text: impl Into<String>) -> Self {
        let displayed = RenderedPoll {
            text: displayed_text.into(),
            button: PollButton::new(record.button_label(), record.routing_id()),
        };
        Self::new(record, Some(displayed))
    }

    /// Copy of the current record.
    pub async fn record(&self) -> PollRecord {
        self.record.lock().await.clone()
    }

    /// Add the voter unless they already voted.
    pub async fn apply_vote(&self, voter: Voter) -> VoteOutcome {
        let mut record = self.record.lock().await;
        let accepted = record.add_voter(voter);
        VoteOutcome {
            accepted,
            tally: record.tally(),
        }
    }

    /// Lock the displayed output. Hold the guard until the edit completes.
    pub async fn display(&self) -> MutexGuard<'_, DisplayState> {
        self.display.lock().await
    }
}

/// Shared mapping from poll id to poll state.
#[derive(Default)]
pub struct PollRegistry {
    polls: RwLock<HashMap<PollId, Arc<PollEntry>>>,
}

impl PollRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new poll with no voters.
    ///
    /// The poll is not registered yet: its id only exists once the transport
    /// has published the message.
    #[must_use]
    pub fn create_poll(
        question: impl Into<String>,
        button_label: impl Into<String>,
    ) -> PollRecord {
        PollRecord::new(question, button_label)
    }

    /// Register a published poll and the output that was sent for it.
    pub async fn register(&self, id: PollId, record: PollRecord, displayed: RenderedPoll) {
        let entry = Arc::new(PollEntry::new(record, Some(displayed)));
        let mut polls = self.polls.write().await;
        if polls.insert(id, entry).is_some() {
            debug!(poll_id = %id, "Replaced existing poll entry");
        }
    }

    /// Get the entry for a poll if it is registered.
    pub async fn entry(&self, id: &PollId) -> Option<Arc<PollEntry>> {
        let polls = self.polls.read().await;
        polls.get(id).cloned()
    }

    /// Get the entry for a poll, registering `recover()` if it is missing.
    ///
    /// Returns the entry and whether it was created by this call. When two
    /// callers race on a missing poll only one recovered entry is kept.
    pub async fn entry_or_recover<F>(
        &self,
        id: PollId,
        recover: F,
    ) -> (Arc<PollEntry>, bool)
    where
        F: FnOnce() -> PollEntry,
    {
        if let Some(entry) = self.entry(&id).await {
            return (entry, false);
        }

        let mut polls = self.polls.write().await;
        if let Some(entry) = polls.get(&id) {
            return (entry.clone(), false);
        }
        let entry = Arc::new(recover());
        polls.insert(id, entry.clone());
        (entry, true)
    }

    /// Apply a vote atomically. Returns `None` for an unknown poll.
    pub async fn apply_vote(&self, id: &PollId, voter: Voter) -> Option<VoteOutcome> {
        let entry = self.entry(id).await?;
        Some(entry.apply_vote(voter).await)
    }

    /// Copy of the current record.
    pub async fn snapshot(&self, id: &PollId) -> Option<PollRecord> {
        let entry = self.entry(id).await?;
        Some(entry.record().await)
    }

    /// Number of registered polls.
    pub async fn len(&self) -> usize {
        self.polls.read().await.len()
    }

    /// Whether no poll is registered.
    pub async fn is_empty(&self) -> bool {
        self.polls.read().await.is_empty()
    }
}
