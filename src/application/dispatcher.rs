//! Inbound event dispatch.
//!
//! Routes each decoded event by the caller's pending conversation wait
//! first, then by event type. Operator privileges are re-checked on
//! every message: a wait survives across turns, so checking only at
//! entry would trust a slot that could have been misrouted.

use std::sync::Arc;

use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountRepository, Choice, ChoiceAction, Clock, MenuKind, Notifier};

use super::command::{ChoiceToken, InboundEvent, MenuCommand};
use super::flow::{ConversationFlow, PendingInput};
use super::handlers::{
    parse_positive_int, EvidenceHandler, ExportHandler, ForceStatusHandler, PricingHandler,
    RegistrationHandler, ReviewHandler, StatsHandler,
};

const HELP_TEXT: &str = "Help\n\nHow to use the bot:\n1. /start - begin registration\n2. Share your phone number\n3. Make the payment\n4. Send a photo of the receipt\n5. The operator reviews it and activates your subscription";

/// The conversation flow controller plus event routing.
pub struct Dispatcher {
    flow: Arc<ConversationFlow>,
    notifier: Arc<dyn Notifier>,
    accounts: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
    registration: RegistrationHandler,
    evidence: EvidenceHandler,
    review: ReviewHandler,
    force: ForceStatusHandler,
    pricing: PricingHandler,
    stats: StatsHandler,
    export: ExportHandler,
    operator: AccountId,
    support_contact: String,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        flow: Arc<ConversationFlow>,
        notifier: Arc<dyn Notifier>,
        accounts: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
        registration: RegistrationHandler,
        evidence: EvidenceHandler,
        review: ReviewHandler,
        force: ForceStatusHandler,
        pricing: PricingHandler,
        stats: StatsHandler,
        export: ExportHandler,
        operator: AccountId,
        support_contact: String,
    ) -> Self {
        Self {
            flow,
            notifier,
            accounts,
            clock,
            registration,
            evidence,
            review,
            force,
            pricing,
            stats,
            export,
            operator,
            support_contact,
        }
    }

    fn is_operator(&self, id: AccountId) -> bool {
        id == self.operator
    }

    /// Processes one inbound unit of work. An `Unauthorized` refusal is
    /// absorbed here: the sender gets no acknowledgement and the gateway
    /// sees a clean result.
    pub async fn dispatch(
        &self,
        from: AccountId,
        event: InboundEvent,
    ) -> Result<(), SubscriptionError> {
        match self.route(from, event).await {
            Err(SubscriptionError::Unauthorized(id)) => {
                tracing::warn!(account_id = %id, "operator-only request refused");
                Ok(())
            }
            other => other,
        }
    }

    async fn route(&self, from: AccountId, event: InboundEvent) -> Result<(), SubscriptionError> {
        match event {
            InboundEvent::Start {
                display_name,
                handle,
            } => {
                self.registration
                    .start(from, &display_name, handle.as_deref())
                    .await
            }

            InboundEvent::OperatorPanel => {
                if !self.is_operator(from) {
                    self.notifier
                        .send_text(from, "You are not the operator.")
                        .await?;
                    return Err(SubscriptionError::Unauthorized(from));
                }
                self.notifier
                    .send_menu(from, "Operator panel", MenuKind::Operator)
                    .await
            }

            InboundEvent::ContactShared { phone, owner_id } => {
                self.registration.record_contact(from, &phone, owner_id).await
            }

            InboundEvent::PhotoSubmitted { evidence_ref } => {
                self.evidence.submit(from, &evidence_ref).await
            }

            InboundEvent::Menu(cmd) => self.on_menu(from, cmd).await,

            InboundEvent::Text(text) => match self.flow.current(from).await {
                Some(PendingInput::FullName) => {
                    self.registration.save_full_name(from, &text).await
                }
                Some(wait) => self.on_operator_wait(from, wait, &text).await,
                None => {
                    tracing::debug!(account_id = %from, "unrecognized free text, ignored");
                    Ok(())
                }
            },

            InboundEvent::Choice(token) => self.on_choice(from, token).await,
        }
    }

    async fn on_menu(&self, from: AccountId, cmd: MenuCommand) -> Result<(), SubscriptionError> {
        if cmd.requires_operator() && !self.is_operator(from) {
            return Err(SubscriptionError::Unauthorized(from));
        }

        match cmd {
            MenuCommand::Profile => self.registration.show_profile(from).await,

            MenuCommand::BuySubscription => {
                let price = self.pricing.current().await?;
                self.notifier
                    .send_text(
                        from,
                        &format!(
                            "Subscription price: {}\nSend a photo of your payment receipt.",
                            price
                        ),
                    )
                    .await
            }

            MenuCommand::ChannelLink => {
                self.notifier
                    .send_choices(
                        from,
                        "Join the channel:",
                        &[Choice::new("Open channel", ChoiceAction::ChannelInvite)],
                    )
                    .await
            }

            MenuCommand::Support => {
                self.notifier
                    .send_text(from, &format!("Contact support: {}", self.support_contact))
                    .await
            }

            MenuCommand::Help => self.notifier.send_text(from, HELP_TEXT).await,

            MenuCommand::Stats => {
                let stats = self.stats.collect().await?;
                self.notifier.send_text(from, &stats.render()).await
            }

            // Export also acts as an escape hatch out of a pending wait.
            MenuCommand::Export => {
                self.flow.clear(from).await;
                self.export.send_to(from).await
            }

            MenuCommand::ChangePrice => {
                self.flow.expect(from, PendingInput::NewPrice).await;
                self.notifier
                    .send_text(from, "Enter the new price (digits only):")
                    .await
            }

            MenuCommand::Activate => {
                self.flow.expect(from, PendingInput::ActivateTarget).await;
                self.notifier
                    .send_text(from, "Send the account id to activate:")
                    .await
            }

            MenuCommand::Deactivate => {
                self.flow.expect(from, PendingInput::DeactivateTarget).await;
                self.notifier
                    .send_text(from, "Send the account id to deactivate:")
                    .await
            }

            MenuCommand::PendingList => self.review.send_pending_queue(from).await,

            MenuCommand::ExitPanel => {
                self.flow.clear(from).await;
                let active = self
                    .accounts
                    .find(from)
                    .await?
                    .map(|a| a.has_access(self.clock.today()))
                    .unwrap_or(false);
                self.notifier
                    .send_menu(from, "Back to the main menu.", MenuKind::Member { active })
                    .await
            }
        }
    }

    /// Handles free text while an operator wait is pending. The identity
    /// check runs here, on the message, not just when the wait was set.
    async fn on_operator_wait(
        &self,
        from: AccountId,
        wait: PendingInput,
        text: &str,
    ) -> Result<(), SubscriptionError> {
        if !self.is_operator(from) {
            // The misrouted slot is dropped so it cannot absorb more input.
            self.flow.clear(from).await;
            return Err(SubscriptionError::Unauthorized(from));
        }

        match wait {
            PendingInput::NewPrice => match self.pricing.change(text).await {
                Ok(price) => {
                    self.flow.clear(from).await;
                    self.notifier
                        .send_menu(
                            from,
                            &format!("Price updated to {}.", price),
                            MenuKind::Operator,
                        )
                        .await
                }
                Err(SubscriptionError::Validation(_)) => {
                    // Wait stays set, operator tries again.
                    self.notifier
                        .send_text(from, "Invalid format. Send digits only.")
                        .await
                }
                Err(err) => Err(err),
            },

            PendingInput::ActivateTarget => {
                self.on_target_wait(from, text, true).await
            }

            PendingInput::DeactivateTarget => {
                self.on_target_wait(from, text, false).await
            }

            // Routed before this point.
            PendingInput::FullName => Ok(()),
        }
    }

    async fn on_target_wait(
        &self,
        from: AccountId,
        text: &str,
        activate: bool,
    ) -> Result<(), SubscriptionError> {
        let raw = match parse_positive_int(text, "account_id") {
            Ok(raw) => raw,
            Err(_) => {
                return self
                    .notifier
                    .send_text(from, "Invalid id. Send a number.")
                    .await;
            }
        };

        self.flow.clear(from).await;
        let target = AccountId::new(raw);
        let result = if activate {
            self.force.activate(target).await
        } else {
            self.force.deactivate(target).await
        };

        match result {
            Ok(_) => {
                let done = if activate {
                    "Account activated."
                } else {
                    "Account deactivated."
                };
                self.notifier
                    .send_menu(from, done, MenuKind::Operator)
                    .await
            }
            Err(SubscriptionError::AccountNotFound(_)) => {
                self.notifier
                    .send_text(from, "No account with that id.")
                    .await
            }
            Err(err) => Err(err),
        }
    }

    async fn on_choice(
        &self,
        from: AccountId,
        token: ChoiceToken,
    ) -> Result<(), SubscriptionError> {
        if !self.is_operator(from) {
            return Err(SubscriptionError::Unauthorized(from));
        }

        match token {
            ChoiceToken::Approve(id) => match self.review.approve(id).await {
                Ok(payment) => {
                    self.notifier
                        .send_text(from, &format!("Payment {} approved.", payment.id))
                        .await
                }
                Err(err) => self.report_review_error(from, err).await,
            },
            ChoiceToken::Reject(id) => match self.review.reject(id).await {
                Ok(payment) => {
                    self.notifier
                        .send_text(from, &format!("Payment {} rejected.", payment.id))
                        .await
                }
                Err(err) => self.report_review_error(from, err).await,
            },
        }
    }

    /// Review failures are all recoverable for the operator except
    /// `Store`, which propagates so the caller can say "try again".
    async fn report_review_error(
        &self,
        operator: AccountId,
        err: SubscriptionError,
    ) -> Result<(), SubscriptionError> {
        let text = match &err {
            SubscriptionError::AlreadyReviewed(_) => "This payment has already been reviewed.",
            SubscriptionError::PaymentNotFound(_) => "Payment not found.",
            SubscriptionError::AccountNotFound(_) => "The account for this payment no longer exists.",
            _ => return Err(err),
        };
        self.notifier.send_text(operator, text).await
    }
}
