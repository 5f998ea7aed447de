//! Registration and profile.
//!
//! `/start` upserts the account and decides what to show: a full-name
//! prompt while the account is unnamed, the active-subscription summary
//! when the window still runs, or the purchase instructions otherwise.
//! Everything else in the bot is gated behind a properly named account.

use std::sync::Arc;

use crate::application::flow::{ConversationFlow, PendingInput};
use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountRepository, Choice, ChoiceAction, Clock, MenuKind, Notifier, PricingStore};

const NAME_PROMPT: &str = "Please send your first and last name. Example: Ali Valiyev";
const NAME_REPROMPT: &str = "Please enter a full name and surname. Example: Ali Valiyev";

/// Handles `/start`, the full-name wait, contact sharing, and the
/// profile view.
pub struct RegistrationHandler {
    accounts: Arc<dyn AccountRepository>,
    pricing: Arc<dyn PricingStore>,
    flow: Arc<ConversationFlow>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl RegistrationHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        pricing: Arc<dyn PricingStore>,
        flow: Arc<ConversationFlow>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            pricing,
            flow,
            notifier,
            clock,
        }
    }

    /// Entry point: upsert the account, then prompt or welcome.
    pub async fn start(
        &self,
        id: AccountId,
        display_name: &str,
        handle: Option<&str>,
    ) -> Result<(), SubscriptionError> {
        let account = self
            .accounts
            .upsert_on_start(id, display_name, handle, self.clock.now())
            .await?;

        if !account.is_named() {
            self.flow.expect(id, PendingInput::FullName).await;
            return self.notifier.send_text(id, NAME_PROMPT).await;
        }

        let today = self.clock.today();
        if let Some(expiry) = account.expiry_date.filter(|_| account.has_access(today)) {
            let days_left = account.days_left(today).unwrap_or(0);
            let summary = format!(
                "Welcome back, {}!\n\nSubscription: active\nValid until: {}\n{} day(s) left",
                account.full_name,
                expiry.format("%d.%m.%Y"),
                days_left,
            );
            self.notifier
                .send_menu(id, &summary, MenuKind::Member { active: true })
                .await?;
            return self
                .notifier
                .send_choices(
                    id,
                    "Join the channel:",
                    &[Choice::new("Open channel", ChoiceAction::ChannelInvite)],
                )
                .await;
        }

        let price = self.pricing.current_price().await?;
        let welcome = format!(
            "Welcome, {}!\n\nSubscription price: {} per month.\n\nTo subscribe:\n1. Share your phone number\n2. Make the payment\n3. Send a photo of the receipt",
            account.full_name, price,
        );
        self.notifier
            .send_menu(id, &welcome, MenuKind::Member { active: false })
            .await
    }

    /// Resolves the full-name wait. Invalid input re-prompts and keeps
    /// the wait; valid input stores the name and clears it.
    pub async fn save_full_name(&self, id: AccountId, text: &str) -> Result<(), SubscriptionError> {
        let trimmed = text.trim();
        if trimmed.split_whitespace().count() < 2 {
            return self.notifier.send_text(id, NAME_REPROMPT).await;
        }

        self.accounts.set_full_name(id, trimmed).await?;
        self.flow.clear(id).await;

        let price = self.pricing.current_price().await?;
        let confirmation = format!(
            "Saved: {}\nSubscription price: {}\nShare your phone number or tap \"Buy subscription\".",
            trimmed, price,
        );
        self.notifier
            .send_menu(id, &confirmation, MenuKind::Member { active: false })
            .await
    }

    /// Stores a shared contact. A contact the platform attributes to a
    /// different user is refused.
    pub async fn record_contact(
        &self,
        id: AccountId,
        phone: &str,
        claimed_owner: Option<AccountId>,
    ) -> Result<(), SubscriptionError> {
        if let Some(owner) = claimed_owner {
            if owner != id {
                return self
                    .notifier
                    .send_text(id, "Please share your own phone number.")
                    .await;
            }
        }

        self.accounts.set_phone(id, phone).await?;
        let price = self.pricing.current_price().await?;
        let text = format!(
            "Phone number saved: {}\nPayment due: {}\nNow send a photo of the receipt.",
            phone, price,
        );
        self.notifier.send_text(id, &text).await
    }

    /// Sends the profile view.
    pub async fn show_profile(&self, id: AccountId) -> Result<(), SubscriptionError> {
        let Some(account) = self.accounts.find(id).await? else {
            return self
                .notifier
                .send_text(id, "Profile not found. Send /start first.")
                .await;
        };

        let mut text = format!(
            "Profile\n\nID: {}\nName: {}\nPhone: {}\nStatus: {}\n",
            account.id,
            account.full_name,
            account.phone.as_deref().unwrap_or("not shared"),
            account.status,
        );
        if let Some(expiry) = account.expiry_date {
            let days_left = account.days_left(self.clock.today()).unwrap_or(0);
            text.push_str(&format!(
                "Subscription: until {} ({} day(s) left)\n",
                expiry.format("%d.%m.%Y"),
                days_left,
            ));
        }
        text.push_str(&format!("Payments: {}", account.total_approved_payments));

        self.notifier.send_text(id, &text).await
    }
}
