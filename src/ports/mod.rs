//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `AccountRepository` / `PaymentLedger` / `PricingStore` - persistence
//! - `Notifier` - outbound gateway deliveries (text, menus, choice sets)
//! - `Clock` - time source, pinnable in tests

mod account_repository;
mod clock;
mod notifier;
mod payment_ledger;
mod pricing_store;
mod table_exporter;

pub use account_repository::AccountRepository;
pub use clock::{Clock, SystemClock};
pub use notifier::{Choice, ChoiceAction, MenuKind, Notifier};
pub use payment_ledger::PaymentLedger;
pub use pricing_store::PricingStore;
pub use table_exporter::TableExporter;
