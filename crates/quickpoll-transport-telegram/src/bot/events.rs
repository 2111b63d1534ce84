//! Update conversion
//!
//! Maps teloxide types onto the transport-agnostic [`InboundEvent`] envelope.

use super::commands::BotCommand;
use quickpoll_core::dispatcher::CallbackEvent;
use quickpoll_core::poll::DisplayedMessage;
use quickpoll_core::InboundEvent;
use teloxide::types::{CallbackQuery, Message, User};
use teloxide::utils::command::{BotCommands, ParseError};
use tracing::debug;

/// Safe extraction of user ID from a message.
/// Returns `None` for messages without a sender (e.g. channel posts).
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> Option<i64> {
    msg.from.as_ref().map(|u| u.id.0.cast_signed())
}

/// Name shown for a user in voter lists.
#[must_use]
pub fn display_name(user: &User) -> String {
    user.username
        .as_ref()
        .map_or_else(|| user.full_name(), |username| format!("@{username}"))
}

/// Convert a text message into a command or free-text event.
///
/// Commands are parsed against `bot_username`; a command addressed to another
/// bot yields `None`, unknown commands are free text. Non-text messages and
/// messages without a sender yield `None` as well.
#[must_use]
pub fn message_event(msg: &Message, bot_username: &str) -> Option<InboundEvent> {
    let text = msg.text()?;
    let user_id = get_user_id_safe(msg)?;
    let chat_id = msg.chat.id.0;

    match BotCommand::parse(text, bot_username) {
        Ok(command) => Some(InboundEvent::command(command.into(), chat_id, user_id, text)),
        Err(ParseError::WrongBotName(name)) => {
            debug!(user_id, chat_id, bot = %name, "Command for another bot ignored");
            None
        }
        Err(_) => Some(InboundEvent::text(chat_id, user_id, text)),
    }
}

/// Convert a button press into a callback event.
///
/// Presses on messages the bot can no longer access, or without payload,
/// yield `None`.
#[must_use]
pub fn callback_event(q: &CallbackQuery) -> Option<InboundEvent> {
    let msg = q.regular_message()?;
    let data = q.data.clone()?;

    let button_label = msg
        .reply_markup()
        .and_then(|markup| markup.inline_keyboard.first())
        .and_then(|row| row.first())
        .map(|button| button.text.clone());

    Some(InboundEvent::Callback(CallbackEvent {
        interaction_id: q.id.0.clone(),
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        user_id: q.from.id.0.cast_signed(),
        user_name: display_name(&q.from),
        data,
        displayed: DisplayedMessage {
            text: msg.text().unwrap_or_default().to_string(),
            button_label,
        },
    }))
}
