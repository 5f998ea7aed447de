//! Aggregate statistics for the operator panel.

use std::sync::Arc;

use futures::try_join;

use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountRepository, PaymentLedger};

/// The operator-facing aggregate counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub pending_payments: i64,
}

impl Stats {
    /// Formats the stats for delivery.
    pub fn render(&self) -> String {
        format!(
            "Statistics\n\nTotal accounts: {}\nActive subscribers: {}\nPending payments: {}",
            self.total_accounts, self.active_accounts, self.pending_payments,
        )
    }
}

/// Collects the aggregate counts.
pub struct StatsHandler {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn PaymentLedger>,
}

impl StatsHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { accounts, ledger }
    }

    pub async fn collect(&self) -> Result<Stats, SubscriptionError> {
        let (total_accounts, active_accounts, pending_payments) = try_join!(
            self.accounts.count_total(),
            self.accounts.count_active(),
            self.ledger.count_pending(),
        )?;
        Ok(Stats {
            total_accounts,
            active_accounts,
            pending_payments,
        })
    }
}
