/// Bot command declarations
pub mod commands;
/// Conversion of Telegram updates into inbound poll events
pub mod events;
/// `PollTransport` implementation on top of the Bot API
pub mod transport;

pub use commands::BotCommand;
pub use transport::TelegramTransport;
