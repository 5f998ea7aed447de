//! Payment ledger port.
//!
//! Append-only-ish record of submitted payment evidence. Records are
//! created pending, resolved exactly once through `commit_review`, and
//! never deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::{AccountId, PaymentId};
use crate::domain::subscription::{Account, Payment, SubscriptionError};

/// Repository port for the payment ledger.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Appends a pending payment for freshly submitted evidence and
    /// assigns its sequential id. `amount` is the caller's snapshot of
    /// the current price.
    async fn submit(
        &self,
        account_id: AccountId,
        amount: i64,
        evidence_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, SubscriptionError>;

    /// Finds a payment by id. Returns `None` if unknown.
    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, SubscriptionError>;

    /// Commits a review decision atomically.
    ///
    /// `payment` carries the resolved status (approved or rejected);
    /// `account` carries the resulting account state for an approval and
    /// is `None` for a rejection, which never touches the account.
    ///
    /// The write is a compare-and-set against `review_status = pending`
    /// in the same transaction as the account update: of two concurrent
    /// reviews of one payment, exactly one commits and the other gets
    /// `AlreadyReviewed` with no mutation.
    ///
    /// # Errors
    ///
    /// - `AlreadyReviewed` when the stored record is no longer pending
    /// - `PaymentNotFound` when the id is unknown
    /// - `Store` when the transaction cannot complete; the decision is
    ///   then not recorded and the caller must surface "try again"
    async fn commit_review(
        &self,
        payment: &Payment,
        account: Option<&Account>,
    ) -> Result<(), SubscriptionError>;

    /// Payments still awaiting review, oldest first.
    async fn list_pending(&self) -> Result<Vec<Payment>, SubscriptionError>;

    /// Number of payments awaiting review.
    async fn count_pending(&self) -> Result<i64, SubscriptionError>;

    /// Every payment, newest first, for the export artifact.
    async fn list_newest_first(&self) -> Result<Vec<Payment>, SubscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn PaymentLedger) {}
    }
}
