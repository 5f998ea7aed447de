//! Command handlers, one concern per file.
//!
//! Each handler owns the ports it needs behind `Arc` and exposes
//! `async` methods invoked by the dispatcher. State changes commit
//! first; notifications are strictly downstream and best-effort.

mod export;
mod force_status;
mod pricing;
mod register;
mod review_payment;
mod stats;
mod submit_evidence;

pub use export::ExportHandler;
pub(crate) use pricing::parse_positive_int;
pub use force_status::ForceStatusHandler;
pub use pricing::PricingHandler;
pub use register::RegistrationHandler;
pub use review_payment::ReviewHandler;
pub use stats::{Stats, StatsHandler};
pub use submit_evidence::EvidenceHandler;

use crate::domain::subscription::SubscriptionError;

/// Logs and swallows a post-commit delivery failure.
///
/// The state transition is already committed when this runs; a blocked
/// user must never look like a failed transaction.
pub(crate) fn swallow_delivery(result: Result<(), SubscriptionError>, context: &'static str) {
    if let Err(err) = result {
        tracing::warn!(error = %err, context, "notification delivery failed");
    }
}
