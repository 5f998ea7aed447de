//! Typed identifiers for domain entities.
//!
//! Both identifiers wrap the raw integers the storage layer and the
//! messaging platform hand us: an `AccountId` is the platform user id,
//! a `PaymentId` is assigned sequentially by the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform user identifier, used as the account primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger-assigned sequential payment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(i64);

impl PaymentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_roundtrips_raw_value() {
        let id = AccountId::new(8_251_830_471);
        assert_eq!(id.as_i64(), 8_251_830_471);
        assert_eq!(id.to_string(), "8251830471");
    }

    #[test]
    fn payment_ids_compare_by_value() {
        assert!(PaymentId::new(1) < PaymentId::new(2));
        assert_eq!(PaymentId::new(7), PaymentId::new(7));
    }
}
