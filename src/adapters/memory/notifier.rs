//! Recording notifier for tests.
//!
//! Captures every outbound delivery and can be told to fail deliveries
//! to specific accounts, which is how the tests prove that a blocked
//! recipient never rolls back a committed state change.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{Choice, MenuKind, Notifier};

/// One captured outbound delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentItem {
    Text {
        to: AccountId,
        text: String,
    },
    Menu {
        to: AccountId,
        text: String,
        menu: MenuKind,
    },
    Choices {
        to: AccountId,
        text: String,
        choices: Vec<Choice>,
    },
    Photo {
        to: AccountId,
        evidence_ref: String,
        caption: String,
        choices: Vec<Choice>,
    },
    Document {
        to: AccountId,
        filename: String,
        caption: String,
        content: Vec<u8>,
    },
}

impl SentItem {
    pub fn recipient(&self) -> AccountId {
        match self {
            SentItem::Text { to, .. }
            | SentItem::Menu { to, .. }
            | SentItem::Choices { to, .. }
            | SentItem::Photo { to, .. }
            | SentItem::Document { to, .. } => *to,
        }
    }
}

/// Notifier double that records instead of delivering.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentItem>>,
    failing: Mutex<HashSet<AccountId>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery to `to` fail from now on.
    pub async fn fail_deliveries_to(&self, to: AccountId) {
        self.failing.lock().await.insert(to);
    }

    /// Everything sent so far, in order.
    pub async fn sent(&self) -> Vec<SentItem> {
        self.sent.lock().await.clone()
    }

    /// Text bodies delivered to one account, in order. Menu and choice
    /// messages count too since they carry text.
    pub async fn texts_to(&self, to: AccountId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|item| item.recipient() == to)
            .filter_map(|item| match item {
                SentItem::Text { text, .. }
                | SentItem::Menu { text, .. }
                | SentItem::Choices { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, item: SentItem) -> Result<(), SubscriptionError> {
        let to = item.recipient();
        if self.failing.lock().await.contains(&to) {
            return Err(SubscriptionError::delivery(to, "recipient blocked"));
        }
        self.sent.lock().await.push(item);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, to: AccountId, text: &str) -> Result<(), SubscriptionError> {
        self.record(SentItem::Text {
            to,
            text: text.to_string(),
        })
        .await
    }

    async fn send_menu(
        &self,
        to: AccountId,
        text: &str,
        menu: MenuKind,
    ) -> Result<(), SubscriptionError> {
        self.record(SentItem::Menu {
            to,
            text: text.to_string(),
            menu,
        })
        .await
    }

    async fn send_choices(
        &self,
        to: AccountId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), SubscriptionError> {
        self.record(SentItem::Choices {
            to,
            text: text.to_string(),
            choices: choices.to_vec(),
        })
        .await
    }

    async fn send_photo_with_choices(
        &self,
        to: AccountId,
        evidence_ref: &str,
        caption: &str,
        choices: &[Choice],
    ) -> Result<(), SubscriptionError> {
        self.record(SentItem::Photo {
            to,
            evidence_ref: evidence_ref.to_string(),
            caption: caption.to_string(),
            choices: choices.to_vec(),
        })
        .await
    }

    async fn send_document(
        &self,
        to: AccountId,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<(), SubscriptionError> {
        self.record(SentItem::Document {
            to,
            filename: filename.to_string(),
            caption: caption.to_string(),
            content,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.send_text(AccountId::new(1), "one").await.unwrap();
        notifier.send_text(AccountId::new(1), "two").await.unwrap();

        assert_eq!(
            notifier.texts_to(AccountId::new(1)).await,
            vec!["one".to_string(), "two".to_string()]
        );
    }

    #[tokio::test]
    async fn failure_injection_is_per_recipient() {
        let notifier = RecordingNotifier::new();
        notifier.fail_deliveries_to(AccountId::new(1)).await;

        assert!(notifier.send_text(AccountId::new(1), "x").await.is_err());
        assert!(notifier.send_text(AccountId::new(2), "y").await.is_ok());
        assert!(notifier.texts_to(AccountId::new(1)).await.is_empty());
    }
}
