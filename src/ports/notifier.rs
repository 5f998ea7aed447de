//! Notifier port, the outbound half of the gateway boundary.
//!
//! The engine hands the gateway plain text, logical menus, and logical
//! choice sets. Platform rendering (buttons, markup, URLs) happens
//! entirely in the adapter; the engine never sees it.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, PaymentId};
use crate::domain::subscription::SubscriptionError;

/// What selecting a choice means to the engine.
///
/// Review choices come back through the gateway as a decoded
/// [`ChoiceToken`](crate::application::ChoiceToken); the invite choice
/// is rendered as a plain link and never comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceAction {
    /// Operator approves the payment.
    ApprovePayment(PaymentId),
    /// Operator rejects the payment.
    RejectPayment(PaymentId),
    /// Open the gated channel invite.
    ChannelInvite,
}

/// One selectable choice in an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action: ChoiceAction,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: ChoiceAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Which persistent menu to show alongside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// End-user menu; `active` selects the subscriber or the
    /// not-yet-subscribed variant.
    Member { active: bool },
    /// Operator panel.
    Operator,
}

/// Outbound delivery port.
///
/// All methods are fire-and-forget from the engine's perspective: a
/// `Delivery` error is logged by the caller and never rolls back a
/// committed state change.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers plain text.
    async fn send_text(&self, to: AccountId, text: &str) -> Result<(), SubscriptionError>;

    /// Delivers text together with a persistent menu.
    async fn send_menu(
        &self,
        to: AccountId,
        text: &str,
        menu: MenuKind,
    ) -> Result<(), SubscriptionError>;

    /// Delivers text with a logical choice set.
    async fn send_choices(
        &self,
        to: AccountId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), SubscriptionError>;

    /// Delivers a proof image (by its opaque gateway handle) with a
    /// caption and a choice set. Used to forward evidence to the
    /// operator.
    async fn send_photo_with_choices(
        &self,
        to: AccountId,
        evidence_ref: &str,
        caption: &str,
        choices: &[Choice],
    ) -> Result<(), SubscriptionError>;

    /// Delivers a file attachment.
    async fn send_document(
        &self,
        to: AccountId,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<(), SubscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn Notifier) {}
    }

    #[test]
    fn choice_carries_typed_action() {
        let choice = Choice::new("Approve", ChoiceAction::ApprovePayment(PaymentId::new(5)));
        assert_eq!(choice.action, ChoiceAction::ApprovePayment(PaymentId::new(5)));
    }
}
