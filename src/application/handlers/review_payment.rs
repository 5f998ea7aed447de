//! Payment review.
//!
//! Approval and rejection are exactly-once: the domain check catches a
//! stale read early, and `commit_review`'s compare-and-set catches the
//! race where two reviews of one payment interleave; only one commits.
//! The account and payment mutation is one transaction; the activation
//! notification runs strictly after it and is never rolled back.

use std::sync::Arc;

use crate::application::locks::AccountLocks;
use crate::domain::foundation::{AccountId, PaymentId};
use crate::domain::subscription::{Payment, SubscriptionError};
use crate::ports::{AccountRepository, Choice, ChoiceAction, Clock, Notifier, PaymentLedger};

use super::submit_evidence::review_choices;
use super::swallow_delivery;

/// Handles operator review decisions and the pending queue.
pub struct ReviewHandler {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn PaymentLedger>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    locks: Arc<AccountLocks>,
    sub_days: i64,
}

impl ReviewHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn PaymentLedger>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        locks: Arc<AccountLocks>,
        sub_days: i64,
    ) -> Self {
        Self {
            accounts,
            ledger,
            notifier,
            clock,
            locks,
            sub_days,
        }
    }

    /// Approves a pending payment: a new subscription window extending
    /// from the current expiry when still in the future, else from today.
    pub async fn approve(&self, payment_id: PaymentId) -> Result<Payment, SubscriptionError> {
        let mut payment = self
            .ledger
            .find(payment_id)
            .await?
            .ok_or(SubscriptionError::PaymentNotFound(payment_id))?;

        // Held from the account read until the commit: a concurrent
        // approval of another payment for the same account must see this
        // one's counter and expiry before computing its own.
        let guard = self.locks.acquire(payment.account_id).await;

        let mut account = self
            .accounts
            .find(payment.account_id)
            .await?
            .ok_or(SubscriptionError::AccountNotFound(payment.account_id))?;

        payment.approve()?;
        account.record_approval(self.clock.today(), self.sub_days)?;

        self.ledger.commit_review(&payment, Some(&account)).await?;
        drop(guard);

        tracing::info!(
            payment_id = %payment.id,
            account_id = %account.id,
            expiry = %account.expiry_date.map(|d| d.to_string()).unwrap_or_default(),
            "payment approved, subscription activated"
        );

        let user = account.id;
        swallow_delivery(
            self.notifier
                .send_text(
                    user,
                    &format!(
                        "Payment approved! Your subscription is active for {} days.",
                        self.sub_days
                    ),
                )
                .await,
            "approval notification",
        );
        swallow_delivery(
            self.notifier
                .send_choices(
                    user,
                    "Join the channel:",
                    &[Choice::new("Open channel", ChoiceAction::ChannelInvite)],
                )
                .await,
            "approval channel invite",
        );

        Ok(payment)
    }

    /// Rejects a pending payment. The account is never touched.
    pub async fn reject(&self, payment_id: PaymentId) -> Result<Payment, SubscriptionError> {
        let mut payment = self
            .ledger
            .find(payment_id)
            .await?
            .ok_or(SubscriptionError::PaymentNotFound(payment_id))?;

        payment.reject()?;
        self.ledger.commit_review(&payment, None).await?;

        tracing::info!(
            payment_id = %payment.id,
            account_id = %payment.account_id,
            "payment rejected"
        );

        Ok(payment)
    }

    /// Re-sends every pending payment to the operator, each with its
    /// approve/reject choices.
    pub async fn send_pending_queue(&self, to: AccountId) -> Result<(), SubscriptionError> {
        let pending = self.ledger.list_pending().await?;
        if pending.is_empty() {
            return self.notifier.send_text(to, "No pending payments.").await;
        }

        for payment in pending {
            let caption = format!(
                "ID: {}, Account: {}, Amount: {}",
                payment.id, payment.account_id, payment.amount,
            );
            swallow_delivery(
                self.notifier
                    .send_photo_with_choices(
                        to,
                        &payment.evidence_ref,
                        &caption,
                        &review_choices(payment.id),
                    )
                    .await,
                "pending queue entry",
            );
        }
        Ok(())
    }
}
