//! Payment record.
//!
//! One record per submitted piece of payment evidence. The amount is a
//! snapshot of the price register at submission time and never changes;
//! the review outcome is written exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, PaymentId, StateMachine};

use super::{ReviewStatus, SubscriptionError};

/// A submitted payment and its review outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Ledger-assigned sequential id.
    pub id: PaymentId,

    /// Account that submitted the evidence.
    pub account_id: AccountId,

    /// Price snapshot at submission time. Immutable.
    pub amount: i64,

    /// Review outcome, resolved exactly once.
    pub review_status: ReviewStatus,

    /// When the evidence was submitted.
    pub submitted_at: DateTime<Utc>,

    /// Opaque handle to the proof image, owned by the gateway.
    pub evidence_ref: String,
}

impl Payment {
    /// Creates a pending payment for freshly submitted evidence.
    pub fn submit(
        id: PaymentId,
        account_id: AccountId,
        amount: i64,
        evidence_ref: String,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            amount,
            review_status: ReviewStatus::Pending,
            submitted_at,
            evidence_ref,
        }
    }

    /// True while the payment awaits review.
    pub fn is_pending(&self) -> bool {
        self.review_status == ReviewStatus::Pending
    }

    /// Marks the payment approved.
    ///
    /// # Errors
    ///
    /// `AlreadyReviewed` if the payment was resolved before; the record
    /// is left untouched.
    pub fn approve(&mut self) -> Result<(), SubscriptionError> {
        self.resolve(ReviewStatus::Approved)
    }

    /// Marks the payment rejected.
    ///
    /// # Errors
    ///
    /// `AlreadyReviewed` if the payment was resolved before.
    pub fn reject(&mut self) -> Result<(), SubscriptionError> {
        self.resolve(ReviewStatus::Rejected)
    }

    fn resolve(&mut self, outcome: ReviewStatus) -> Result<(), SubscriptionError> {
        self.review_status = self
            .review_status
            .transition_to(outcome)
            .map_err(|_| SubscriptionError::AlreadyReviewed(self.id))?;
        Ok(())
    }
}
