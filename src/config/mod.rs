//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the
//! `CHANNEL_GATE` prefix and `__` as the nesting separator.
//!
//! # Example
//!
//! ```no_run
//! use channel_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod bot;
mod database;
mod error;
mod subscription;

pub use bot::BotConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use subscription::SubscriptionConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Telegram gateway configuration
    pub bot: BotConfig,

    /// Database configuration (SQLite)
    pub database: DatabaseConfig,

    /// Subscription period and sweep policy
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables such as
    /// `CHANNEL_GATE__BOT__TOKEN` and `CHANNEL_GATE__DATABASE__URL`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHANNEL_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.bot.validate()?;
        self.database.validate()?;
        self.subscription.validate()?;
        Ok(())
    }
}
