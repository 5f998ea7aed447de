//! SQLite adapters for the persistence ports.
//!
//! Single-file database, one pool shared by all three adapters. The
//! guarded updates (`try_mark_warned`, `try_expire`, the pending check
//! in `commit_review`) are plain conditional UPDATEs, so concurrency
//! control lives in the database rather than in process memory.

mod account_repository;
mod payment_ledger;
mod pricing_store;

pub use account_repository::SqliteAccountRepository;
pub use payment_ledger::SqlitePaymentLedger;
pub use pricing_store::SqlitePricingStore;
