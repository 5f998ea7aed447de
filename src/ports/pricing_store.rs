//! Pricing register port.
//!
//! A single mutable current price. Readers may observe the old or the
//! new value around an update, never a partial write; implementations
//! guard the row with their own transaction.

use async_trait::async_trait;

use crate::domain::subscription::SubscriptionError;

/// Port for the single-row pricing register.
#[async_trait]
pub trait PricingStore: Send + Sync {
    /// Current subscription price.
    async fn current_price(&self) -> Result<i64, SubscriptionError>;

    /// Replaces the price. Callers validate positivity before this point.
    async fn set_price(&self, price: i64) -> Result<(), SubscriptionError>;
}
