//! Bot command declarations.

use quickpoll_core::Command;
use teloxide::utils::command::BotCommands;

/// Supported commands for the bot
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum BotCommand {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Show usage
    #[command(description = "Show usage.")]
    Help,
    /// Create a poll
    #[command(description = "Create a poll.")]
    NewPoll,
    /// Abort poll creation
    #[command(description = "Abort poll creation.")]
    Cancel,
    /// Show operator counters
    #[command(description = "Show bot statistics.")]
    Stats,
    /// Check bot health
    #[command(description = "Check bot health.")]
    Health,
}

impl From<BotCommand> for Command {
    fn from(command: BotCommand) -> Self {
        match command {
            BotCommand::Start => Self::Start,
            BotCommand::Help => Self::Help,
            BotCommand::NewPoll => Self::NewPoll,
            BotCommand::Cancel => Self::Cancel,
            BotCommand::Stats => Self::Stats,
            BotCommand::Health => Self::Health,
        }
    }
}
