//! Bot API implementation of [`PollTransport`].
//!
//! Every call is issued once, without retry.

use async_trait::async_trait;
use quickpoll_core::poll::PollButton;
use quickpoll_core::{EditOutcome, PollTransport, TransportError};
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId,
};
use teloxide::{ApiError, RequestError};

/// Telegram-backed transport.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wrap a bot handle.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Single-button inline keyboard for a poll.
#[must_use]
pub fn poll_keyboard(button: &PollButton) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        button.label.clone(),
        button.routing_id.clone(),
    )]])
}

fn request_error(e: RequestError) -> TransportError {
    TransportError::Request(e.to_string())
}

#[async_trait]
impl PollTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<i32, TransportError> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);
        if let Some(button) = button {
            req = req.reply_markup(poll_keyboard(&button));
        }
        let msg = req.await.map_err(request_error)?;
        Ok(msg.id.0)
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<EditOutcome, TransportError> {
        let mut req = self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text);
        if let Some(button) = button {
            req = req.reply_markup(poll_keyboard(&button));
        }
        match req.await {
            Ok(_) => Ok(EditOutcome::Edited),
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(EditOutcome::Unchanged),
            Err(e) => Err(request_error(e)),
        }
    }

    async fn acknowledge_interaction(
        &self,
        interaction_id: &str,
        private_text: Option<String>,
    ) -> Result<(), TransportError> {
        let mut req = self
            .bot
            .answer_callback_query(CallbackQueryId(interaction_id.to_string()));
        if let Some(text) = private_text {
            req = req.text(text).show_alert(false);
        }
        req.await.map_err(request_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn keyboard_has_single_callback_button() {
        let markup = poll_keyboard(&PollButton::new("Vote", "vote:abc"));
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 1);

        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, "Vote");
        assert!(matches!(
            &button.kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "vote:abc"
        ));
    }
}
