//! Ledger and accounts export.
//!
//! Renders both tables newest-first through the exporter port and
//! delivers them to the operator as two documents.

use std::sync::Arc;

use crate::domain::foundation::AccountId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{AccountRepository, Notifier, PaymentLedger, TableExporter};

/// Handles the operator export command.
pub struct ExportHandler {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn PaymentLedger>,
    exporter: Arc<dyn TableExporter>,
    notifier: Arc<dyn Notifier>,
}

impl ExportHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn PaymentLedger>,
        exporter: Arc<dyn TableExporter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            exporter,
            notifier,
        }
    }

    /// Builds and delivers both tables to the requester.
    pub async fn send_to(&self, to: AccountId) -> Result<(), SubscriptionError> {
        let accounts = self.accounts.list_newest_first().await?;
        let payments = self.ledger.list_newest_first().await?;

        let ext = self.exporter.file_extension();
        let accounts_doc = self.exporter.accounts_table(&accounts);
        let payments_doc = self.exporter.payments_table(&payments);

        tracing::info!(
            accounts = accounts.len(),
            payments = payments.len(),
            "export generated"
        );

        self.notifier
            .send_document(
                to,
                &format!("accounts.{ext}"),
                accounts_doc,
                "All registered accounts",
            )
            .await?;
        self.notifier
            .send_document(
                to,
                &format!("payments.{ext}"),
                payments_doc,
                "Full payment ledger",
            )
            .await
    }
}
