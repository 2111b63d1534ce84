//! Configuration management
//!
//! Poll behaviour settings plus the shared [`build_config`] loader used by
//! every crate in the workspace.

use crate::poll::TallyStyle;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Poll behaviour settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// How the tally is displayed (`count` or `names`)
    #[serde(default)]
    pub tally_style: TallyStyle,
    /// Send a private "already voted" notice on repeated presses
    #[serde(default = "default_duplicate_vote_notice")]
    pub duplicate_vote_notice: bool,
    /// User IDs allowed to see operator counters, comma separated
    #[serde(rename = "operator_ids", default)]
    pub operator_ids_str: Option<String>,
}

const fn default_duplicate_vote_notice() -> bool {
    true
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            tally_style: TallyStyle::default(),
            duplicate_vote_notice: default_duplicate_vote_notice(),
            operator_ids_str: None,
        }
    }
}

impl PollSettings {
    /// Load settings from configuration files and the environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Returns the set of operator user IDs.
    #[must_use]
    pub fn operator_ids(&self) -> HashSet<i64> {
        self.operator_ids_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .filter_map(|id| id.parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Build the layered configuration.
///
/// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__*` environment variables, plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // UPPER_SNAKE_CASE is mapped to snake_case; empty vars count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}
