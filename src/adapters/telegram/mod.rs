//! Telegram gateway adapter: the Bot API client, keyboard rendering,
//! the outbound notifier and the inbound update router.

mod api;
mod menu;
mod notifier;
mod router;

pub use api::{TelegramClient, TelegramError};
pub use notifier::TelegramNotifier;
pub use router::UpdateRouter;
