//! Subscription error taxonomy.
//!
//! Every error here is recoverable for the caller except `Store`, which
//! is fatal for the current operation and surfaced as "try again".
//! `Delivery` is special: it is logged and swallowed by the handlers,
//! never propagated past a committed state change.

use crate::domain::foundation::{AccountId, PaymentId, ValidationError};
use thiserror::Error;

/// Errors produced by the subscription engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// Malformed input (name, price, target id). The caller re-prompts
    /// the same conversation wait.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The payment was already approved or rejected. No mutation was
    /// performed; the operator is informed.
    #[error("payment {0} has already been reviewed")]
    AlreadyReviewed(PaymentId),

    /// No account with this id.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// No payment with this id.
    #[error("payment {0} not found")]
    PaymentNotFound(PaymentId),

    /// A non-operator invoked an operator-only transition.
    #[error("caller {0} is not the operator")]
    Unauthorized(AccountId),

    /// The gateway could not reach the user (blocked, deleted chat).
    /// Logged by the caller, never retried synchronously, and never
    /// rolls back a committed state change.
    #[error("delivery to {account_id} failed: {reason}")]
    Delivery { account_id: AccountId, reason: String },

    /// The persistence layer is unreachable or rejected the operation.
    #[error("store unavailable: {0}")]
    Store(String),
}

impl SubscriptionError {
    /// Creates a delivery error for the given recipient.
    pub fn delivery(account_id: AccountId, reason: impl Into<String>) -> Self {
        SubscriptionError::Delivery {
            account_id,
            reason: reason.into(),
        }
    }

    /// Creates a store error from any displayable cause.
    pub fn store(cause: impl std::fmt::Display) -> Self {
        SubscriptionError::Store(cause.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_reviewed_displays_payment_id() {
        let err = SubscriptionError::AlreadyReviewed(PaymentId::new(42));
        assert_eq!(format!("{}", err), "payment 42 has already been reviewed");
    }

    #[test]
    fn validation_error_converts() {
        let err: SubscriptionError = ValidationError::empty_field("full_name").into();
        assert!(matches!(err, SubscriptionError::Validation(_)));
    }

    #[test]
    fn store_error_keeps_cause() {
        let err = SubscriptionError::store("connection refused");
        assert_eq!(format!("{}", err), "store unavailable: connection refused");
    }
}
