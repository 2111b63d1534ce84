#![deny(missing_docs)]
//! QuickPoll core library.
//!
//! Transport-agnostic poll logic: the per-user creation dialog, the shared
//! poll registry, the tally renderer and the update dispatcher.

/// Configuration management.
pub mod config;
/// Per-user poll creation dialog.
pub mod dialog;
/// Inbound event classification and routing.
pub mod dispatcher;
/// Error types shared across the crate.
pub mod error;
/// Poll records, registry and rendering.
pub mod poll;
/// Outbound transport interface.
pub mod transport;
/// User-facing texts.
pub mod views;

pub use dispatcher::{Command, InboundEvent, UpdateDispatcher};
pub use error::{DispatchError, TransportError};
pub use transport::{EditOutcome, PollTransport};
