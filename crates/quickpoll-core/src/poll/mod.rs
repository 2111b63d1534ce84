//! Poll state: records, the shared registry and the renderer.

/// Poll records and identifiers.
pub mod record;
/// Shared poll registry with per-poll vote serialization.
pub mod registry;
/// Pure poll rendering.
pub mod render;

pub use record::{is_vote_routing_id, PollId, PollRecord, Voter, VOTE_ROUTING_PREFIX};
pub use registry::{DisplayState, PollEntry, PollRegistry, VoteOutcome};
pub use render::{DisplayedMessage, PollButton, PollRenderer, RenderedPoll, TallyStyle};
