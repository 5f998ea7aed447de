//! Long-poll update router.
//!
//! Pulls updates with `getUpdates`, decodes each into an inbound event
//! exactly once, and hands it to the dispatcher on its own task so one
//! slow conversation never blocks the poll loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::application::{Dispatcher, InboundEvent};
use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;

use super::api::{TelegramClient, Update};
use super::menu;

const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// The inbound half of the gateway.
pub struct UpdateRouter {
    client: Arc<TelegramClient>,
    dispatcher: Arc<Dispatcher>,
}

impl UpdateRouter {
    pub fn new(client: Arc<TelegramClient>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { client, dispatcher }
    }

    /// Polls until the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset: Option<i64> = None;

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("update router stopping");
                        return;
                    }
                }

                result = self.client.get_updates(offset, POLL_TIMEOUT_SECS) => {
                    match result {
                        Ok(updates) => {
                            for update in updates {
                                offset = Some(update.update_id + 1);
                                self.route(update).await;
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "getUpdates failed, backing off");
                            tokio::time::sleep(POLL_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }
    }

    async fn route(&self, update: Update) {
        // Ack callback presses regardless of what the dispatch does, so
        // the operator's client stops showing a spinner.
        if let Some(query) = &update.callback_query {
            if let Err(err) = self.client.answer_callback_query(&query.id).await {
                tracing::debug!(error = %err, "callback ack failed");
            }
        }

        let Some((from, event)) = decode_update(&update) else {
            tracing::debug!(update_id = update.update_id, "update carries nothing routable");
            return;
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(err) = dispatcher.dispatch(from, event).await {
                tracing::error!(account_id = %from, error = %err, "dispatch failed");
                if matches!(err, SubscriptionError::Store(_)) {
                    if let Err(err) = client
                        .send_message(from.as_i64(), "Something went wrong. Please try again.", None)
                        .await
                    {
                        tracing::warn!(error = %err, "failure notice undeliverable");
                    }
                }
            }
        });
    }
}

/// Decodes one platform update into an addressed inbound event.
fn decode_update(update: &Update) -> Option<(AccountId, InboundEvent)> {
    if let Some(query) = &update.callback_query {
        let token = query.data.as_deref().and_then(menu::decode_review)?;
        return Some((AccountId::new(query.from.id), InboundEvent::Choice(token)));
    }

    let message = update.message.as_ref()?;
    let from = message.from.as_ref()?;
    let account_id = AccountId::new(from.id);

    if let Some(contact) = &message.contact {
        return Some((
            account_id,
            InboundEvent::ContactShared {
                phone: contact.phone_number.clone(),
                owner_id: contact.user_id.map(AccountId::new),
            },
        ));
    }

    if let Some(sizes) = &message.photo {
        // Largest rendition carries the most legible receipt.
        let best = sizes.iter().max_by_key(|s| s.width * s.height)?;
        return Some((
            account_id,
            InboundEvent::PhotoSubmitted {
                evidence_ref: best.file_id.clone(),
            },
        ));
    }

    let text = message.text.as_deref()?.trim();
    let event = if text == "/start" || text.starts_with("/start ") {
        InboundEvent::Start {
            display_name: from.display_name(),
            handle: from.username.clone(),
        }
    } else if text == "/admin" {
        InboundEvent::OperatorPanel
    } else if let Some(cmd) = menu::command_for_label(text) {
        InboundEvent::Menu(cmd)
    } else {
        InboundEvent::Text(text.to_string())
    };

    Some((account_id, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ChoiceToken, MenuCommand};
    use crate::domain::foundation::PaymentId;
    use super::super::api::{CallbackQuery, Chat, Contact, Message, PhotoSize, User};

    fn user(id: i64) -> User {
        User {
            id,
            first_name: "Ali".to_string(),
            last_name: Some("Valiyev".to_string()),
            username: Some("ali".to_string()),
        }
    }

    fn text_update(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 1,
                from: Some(user(7)),
                chat: Chat { id: 7 },
                text: Some(text.to_string()),
                contact: None,
                photo: None,
            }),
            callback_query: None,
        }
    }

    #[test]
    fn start_command_decodes_identity() {
        let (from, event) = decode_update(&text_update("/start")).unwrap();
        assert_eq!(from, AccountId::new(7));
        assert_eq!(
            event,
            InboundEvent::Start {
                display_name: "Ali Valiyev".to_string(),
                handle: Some("ali".to_string()),
            }
        );
    }

    #[test]
    fn menu_label_decodes_to_command() {
        let (_, event) = decode_update(&text_update(super::super::menu::BTN_HELP)).unwrap();
        assert_eq!(event, InboundEvent::Menu(MenuCommand::Help));
    }

    #[test]
    fn free_text_falls_through() {
        let (_, event) = decode_update(&text_update("Ali Valiyev")).unwrap();
        assert_eq!(event, InboundEvent::Text("Ali Valiyev".to_string()));
    }

    #[test]
    fn photo_picks_largest_rendition() {
        let mut update = text_update("");
        if let Some(message) = update.message.as_mut() {
            message.text = None;
            message.photo = Some(vec![
                PhotoSize {
                    file_id: "small".to_string(),
                    width: 90,
                    height: 90,
                },
                PhotoSize {
                    file_id: "large".to_string(),
                    width: 800,
                    height: 800,
                },
            ]);
        }

        let (_, event) = decode_update(&update).unwrap();
        assert_eq!(
            event,
            InboundEvent::PhotoSubmitted {
                evidence_ref: "large".to_string()
            }
        );
    }

    #[test]
    fn contact_carries_platform_owner_claim() {
        let mut update = text_update("");
        if let Some(message) = update.message.as_mut() {
            message.text = None;
            message.contact = Some(Contact {
                phone_number: "+998901234567".to_string(),
                user_id: Some(7),
            });
        }

        let (from, event) = decode_update(&update).unwrap();
        assert_eq!(from, AccountId::new(7));
        assert_eq!(
            event,
            InboundEvent::ContactShared {
                phone: "+998901234567".to_string(),
                owner_id: Some(AccountId::new(7)),
            }
        );
    }

    #[test]
    fn callback_routes_by_presser_not_chat() {
        let update = Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "q1".to_string(),
                from: user(99),
                data: Some("reject:12".to_string()),
            }),
        };

        let (from, event) = decode_update(&update).unwrap();
        assert_eq!(from, AccountId::new(99));
        assert_eq!(
            event,
            InboundEvent::Choice(ChoiceToken::Reject(PaymentId::new(12)))
        );
    }

    #[test]
    fn unroutable_update_is_dropped() {
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: None,
        };
        assert!(decode_update(&update).is_none());
    }
}
