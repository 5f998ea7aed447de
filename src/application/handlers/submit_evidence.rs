//! Payment evidence submission.
//!
//! A submitted photo becomes a pending ledger record with the current
//! price snapshotted in. The user's confirmation and the forward to the
//! operator are both best-effort: the record is already committed.

use std::sync::Arc;

use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{Choice, ChoiceAction, Clock, Notifier, PaymentLedger, PricingStore};

use super::swallow_delivery;

/// Handles inbound payment evidence.
pub struct EvidenceHandler {
    ledger: Arc<dyn PaymentLedger>,
    pricing: Arc<dyn PricingStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    operator: AccountId,
}

impl EvidenceHandler {
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        pricing: Arc<dyn PricingStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        operator: AccountId,
    ) -> Self {
        Self {
            ledger,
            pricing,
            notifier,
            clock,
            operator,
        }
    }

    /// Records the evidence and forwards it to the operator for review.
    pub async fn submit(
        &self,
        from: AccountId,
        evidence_ref: &str,
    ) -> Result<(), SubscriptionError> {
        let price = self.pricing.current_price().await?;
        let payment = self
            .ledger
            .submit(from, price, evidence_ref, self.clock.now())
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            account_id = %from,
            amount = payment.amount,
            "payment evidence recorded"
        );

        swallow_delivery(
            self.notifier
                .send_text(from, "Receipt received. The operator will review it.")
                .await,
            "evidence confirmation",
        );

        let caption = format!(
            "New payment\nID: {}\nAccount: {}\nAmount: {}",
            payment.id, from, payment.amount,
        );
        swallow_delivery(
            self.notifier
                .send_photo_with_choices(
                    self.operator,
                    evidence_ref,
                    &caption,
                    &review_choices(payment.id),
                )
                .await,
            "evidence forward to operator",
        );

        Ok(())
    }
}

/// The approve/reject choice set attached to a forwarded receipt.
pub(crate) fn review_choices(payment_id: crate::domain::foundation::PaymentId) -> [Choice; 2] {
    [
        Choice::new("Approve", ChoiceAction::ApprovePayment(payment_id)),
        Choice::new("Reject", ChoiceAction::RejectPayment(payment_id)),
    ]
}
