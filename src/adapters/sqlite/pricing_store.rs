//! SQLite adapter for the pricing register. A single guarded row,
//! seeded by the migrations.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::subscription::SubscriptionError;
use crate::ports::PricingStore;

pub struct SqlitePricingStore {
    pool: SqlitePool,
}

impl SqlitePricingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingStore for SqlitePricingStore {
    async fn current_price(&self) -> Result<i64, SubscriptionError> {
        sqlx::query_scalar("SELECT price FROM pricing WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(SubscriptionError::store)
    }

    async fn set_price(&self, price: i64) -> Result<(), SubscriptionError> {
        sqlx::query("UPDATE pricing SET price = ?1 WHERE id = 1")
            .bind(price)
            .execute(&self.pool)
            .await
            .map_err(SubscriptionError::store)?;
        Ok(())
    }
}
