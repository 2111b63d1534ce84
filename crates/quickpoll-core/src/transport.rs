//! Outbound transport interface
//!
//! The dispatcher never talks to a chat API directly. Every outbound call goes
//! through [`PollTransport`], which the Telegram adapter implements.

use crate::error::TransportError;
use crate::poll::PollButton;
use async_trait::async_trait;
use std::sync::Arc;

/// Result of an edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The message content changed
    Edited,
    /// The transport reported the content as already identical
    Unchanged,
}

/// Outbound operations consumed by the dispatcher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollTransport: Send + Sync {
    /// Send a message, optionally with a single inline button. Returns the message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<i32, TransportError>;

    /// Replace the text (and button) of a previously sent message.
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<EditOutcome, TransportError>;

    /// Acknowledge a button press, optionally with a notice only the presser sees.
    async fn acknowledge_interaction(
        &self,
        interaction_id: &str,
        private_text: Option<String>,
    ) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: PollTransport + ?Sized> PollTransport for Arc<T> {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<i32, TransportError> {
        (**self).send_message(chat_id, text, button).await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<EditOutcome, TransportError> {
        (**self)
            .edit_message_text(chat_id, message_id, text, button)
            .await
    }

    async fn acknowledge_interaction(
        &self,
        interaction_id: &str,
        private_text: Option<String>,
    ) -> Result<(), TransportError> {
        (**self)
            .acknowledge_interaction(interaction_id, private_text)
            .await
    }
}
