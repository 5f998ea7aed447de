//! Table exporter port.
//!
//! The export artifact is two tables (accounts, payments) rendered by an
//! external tabular utility. The engine only supplies the rows.

use crate::domain::subscription::{Account, Payment};

/// Renders domain rows into tabular documents.
pub trait TableExporter: Send + Sync {
    /// Renders the accounts table, rows in the order given.
    fn accounts_table(&self, accounts: &[Account]) -> Vec<u8>;

    /// Renders the payments table, rows in the order given.
    fn payments_table(&self, payments: &[Payment]) -> Vec<u8>;

    /// File extension for the produced documents, without the dot.
    fn file_extension(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_exporter_is_object_safe() {
        fn _accepts_dyn(_exporter: &dyn TableExporter) {}
    }
}
