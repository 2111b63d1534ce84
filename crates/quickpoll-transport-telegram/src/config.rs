//! Telegram transport settings.

use config::ConfigError;
use quickpoll_core::config::PollSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    pub telegram_token: String,
    /// Alternative Bot API base address (e.g. a local Bot API server).
    pub telegram_api_url: Option<String>,
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Poll behaviour settings.
    pub poll: Arc<PollSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(poll: PollSettings, telegram: TelegramSettings) -> Self {
        Self {
            poll: Arc::new(poll),
            telegram: Arc::new(telegram),
        }
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails, the token is missing or
    /// empty, or the API address is not a valid URL.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = quickpoll_core::config::build_config()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the values that make startup impossible.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message("TELEGRAM_TOKEN is empty".to_string()));
        }
        self.api_url()?;
        Ok(())
    }

    /// Parsed Bot API base address, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the address is not a valid URL.
    pub fn api_url(&self) -> Result<Option<Url>, ConfigError> {
        self.telegram_api_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ConfigError::Message(format!("TELEGRAM_API_URL is invalid: {e}"))
                })
            })
            .transpose()
    }
}
