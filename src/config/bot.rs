//! Gateway (bot) configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Telegram gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Bot API token
    pub token: Secret<String>,

    /// Platform user id of the single operator
    pub operator_id: i64,

    /// Invite link to the gated channel
    pub channel_invite_url: String,

    /// Contact shown by the support command
    #[serde(default = "default_support_contact")]
    pub support_contact: String,
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("BOT__TOKEN"));
        }
        if self.operator_id <= 0 {
            return Err(ValidationError::InvalidOperatorId);
        }
        if !self.channel_invite_url.starts_with("https://") {
            return Err(ValidationError::InvalidInviteUrl);
        }
        Ok(())
    }
}

fn default_support_contact() -> String {
    "@support".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BotConfig {
        BotConfig {
            token: Secret::new("123:abc".to_string()),
            operator_id: 42,
            channel_invite_url: "https://t.me/+invite".to_string(),
            support_contact: default_support_contact(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn empty_token_fails() {
        let mut config = valid();
        config.token = Secret::new(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_operator_fails() {
        let mut config = valid();
        config.operator_id = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn plain_http_invite_fails() {
        let mut config = valid();
        config.channel_invite_url = "http://t.me/+invite".to_string();
        assert!(config.validate().is_err());
    }
}
