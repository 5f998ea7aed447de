//! Pricing register access.

use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::subscription::SubscriptionError;
use crate::ports::PricingStore;

/// Reads and updates the single current price.
pub struct PricingHandler {
    pricing: Arc<dyn PricingStore>,
}

impl PricingHandler {
    pub fn new(pricing: Arc<dyn PricingStore>) -> Self {
        Self { pricing }
    }

    /// Current subscription price.
    pub async fn current(&self) -> Result<i64, SubscriptionError> {
        self.pricing.current_price().await
    }

    /// Validates operator input and updates the price.
    ///
    /// # Errors
    ///
    /// `Validation` when the input is not a positive integer; the caller
    /// re-prompts the same wait.
    pub async fn change(&self, input: &str) -> Result<i64, SubscriptionError> {
        let price = parse_positive_int(input, "price")?;
        self.pricing.set_price(price).await?;
        tracing::info!(price, "subscription price updated");
        Ok(price)
    }
}

/// Shared validator for operator-typed integers (price, target ids).
pub(crate) fn parse_positive_int(input: &str, field: &'static str) -> Result<i64, SubscriptionError> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ValidationError::not_a_positive_integer(field, trimmed).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_positive_integers() {
        assert_eq!(parse_positive_int("30000", "price").unwrap(), 30_000);
        assert_eq!(parse_positive_int("  42 ", "price").unwrap(), 42);
    }

    #[test]
    fn parse_refuses_garbage_zero_and_negatives() {
        assert!(parse_positive_int("abc", "price").is_err());
        assert!(parse_positive_int("0", "price").is_err());
        assert!(parse_positive_int("-5", "price").is_err());
        assert!(parse_positive_int("", "price").is_err());
    }
}
