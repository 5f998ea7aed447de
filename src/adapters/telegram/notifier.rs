//! Telegram-backed notifier.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{Choice, ChoiceAction, MenuKind, Notifier};

use super::api::{
    InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup, TelegramClient, TelegramError,
};
use super::menu;

/// Delivers engine messages through the Bot API.
pub struct TelegramNotifier {
    client: Arc<TelegramClient>,
    invite_url: String,
}

impl TelegramNotifier {
    pub fn new(client: Arc<TelegramClient>, invite_url: impl Into<String>) -> Self {
        Self {
            client,
            invite_url: invite_url.into(),
        }
    }

    fn render_choices(&self, choices: &[Choice]) -> ReplyMarkup {
        let row = choices
            .iter()
            .map(|choice| match choice.action {
                ChoiceAction::ChannelInvite => {
                    InlineKeyboardButton::link(choice.label.as_str(), self.invite_url.as_str())
                }
                action => {
                    // Review actions always encode; checked by the codec tests.
                    let data = menu::encode_review(action).unwrap_or_default();
                    InlineKeyboardButton::callback(choice.label.as_str(), data)
                }
            })
            .collect();

        ReplyMarkup::Inline(InlineKeyboardMarkup {
            inline_keyboard: vec![row],
        })
    }

    fn delivery_err(to: AccountId, err: TelegramError) -> SubscriptionError {
        SubscriptionError::delivery(to, err.to_string())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, to: AccountId, text: &str) -> Result<(), SubscriptionError> {
        self.client
            .send_message(to.as_i64(), text, None)
            .await
            .map(|_| ())
            .map_err(|e| Self::delivery_err(to, e))
    }

    async fn send_menu(
        &self,
        to: AccountId,
        text: &str,
        menu: MenuKind,
    ) -> Result<(), SubscriptionError> {
        let markup = ReplyMarkup::Keyboard(menu::keyboard_for(menu));
        self.client
            .send_message(to.as_i64(), text, Some(markup))
            .await
            .map(|_| ())
            .map_err(|e| Self::delivery_err(to, e))
    }

    async fn send_choices(
        &self,
        to: AccountId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), SubscriptionError> {
        let markup = self.render_choices(choices);
        self.client
            .send_message(to.as_i64(), text, Some(markup))
            .await
            .map(|_| ())
            .map_err(|e| Self::delivery_err(to, e))
    }

    async fn send_photo_with_choices(
        &self,
        to: AccountId,
        evidence_ref: &str,
        caption: &str,
        choices: &[Choice],
    ) -> Result<(), SubscriptionError> {
        let markup = self.render_choices(choices);
        self.client
            .send_photo(to.as_i64(), evidence_ref, caption, Some(markup))
            .await
            .map(|_| ())
            .map_err(|e| Self::delivery_err(to, e))
    }

    async fn send_document(
        &self,
        to: AccountId,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<(), SubscriptionError> {
        self.client
            .send_document(to.as_i64(), filename, content, caption)
            .await
            .map(|_| ())
            .map_err(|e| Self::delivery_err(to, e))
    }
}
