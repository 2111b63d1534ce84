#![deny(missing_docs)]
//! Telegram transport adapter for QuickPoll.

/// Telegram-specific event conversion and outbound calls.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// Telegram runtime entrypoint.
pub mod runner;
