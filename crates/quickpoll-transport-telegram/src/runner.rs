//! Telegram runtime
//!
//! teloxide's dispatcher feeds updates of one chat to the handler one at a
//! time and runs different chats concurrently, which is the ordering the poll
//! dispatcher relies on.

use crate::bot::events::{callback_event, message_event};
use crate::bot::{BotCommand, TelegramTransport};
use crate::config::BotSettings;
use anyhow::Result;
use quickpoll_core::{InboundEvent, UpdateDispatcher};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Me};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Poll dispatcher bound to the Telegram transport.
pub type PollDispatcher = UpdateDispatcher<TelegramTransport>;

/// Run the Telegram transport runtime until interrupted.
///
/// # Errors
///
/// Returns an error if the configured API address is invalid.
pub async fn run_bot(settings: Arc<BotSettings>) -> Result<()> {
    let mut bot = Bot::new(settings.telegram.telegram_token.clone());
    if let Some(url) = settings.telegram.api_url()? {
        info!("Using Bot API at {url}");
        bot = bot.set_api_url(url);
    }

    let dispatcher: Arc<PollDispatcher> = Arc::new(UpdateDispatcher::new(
        TelegramTransport::new(bot.clone()),
        &settings.poll,
    ));
    info!(
        "Poll dispatcher initialized (tally style: {:?}, duplicate notice: {})",
        settings.poll.tally_style, settings.poll.duplicate_vote_notice
    );

    if let Err(e) = bot.set_my_commands(BotCommand::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .filter_map(|msg: Message, me: Me| message_event(&msg, me.username()))
                .endpoint(handle_event),
        )
}

async fn handle_event(
    event: InboundEvent,
    dispatcher: Arc<PollDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = dispatcher.dispatch(event).await {
        error!(error = %e, "Event handler error");
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<PollDispatcher>,
) -> Result<(), teloxide::RequestError> {
    let Some(event) = callback_event(&q) else {
        warn!(
            user_id = q.from.id.0,
            "Callback without accessible message or payload"
        );
        if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
            error!(error = %e, "Failed to acknowledge callback");
        }
        return respond(());
    };

    if let Err(e) = dispatcher.dispatch(event).await {
        error!(user_id = q.from.id.0, error = %e, "Vote handler error");
    }
    respond(())
}
