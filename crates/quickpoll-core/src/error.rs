//! Error types for the poll engine.
//!
//! Duplicate votes, unchanged renders and unknown polls are not errors and
//! never show up here; only failed outbound calls do.

use thiserror::Error;

/// Failure of an outbound send/edit/acknowledge call.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request reached the transport but failed
    #[error("Transport request failed: {0}")]
    Request(String),
}

/// Failure while handling a single inbound event.
///
/// Mutations committed before the failure are kept; the event is dropped.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// An outbound call failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}
