//! Subscription bounded context.
//!
//! The lifecycle core: accounts, submitted payments, their status state
//! machines, and the error taxonomy shared across the engine.

mod account;
mod errors;
mod payment;
mod status;

pub use account::{Account, WarningFlag};
pub use errors::SubscriptionError;
pub use payment::Payment;
pub use status::{LifecycleStatus, ReviewStatus};
