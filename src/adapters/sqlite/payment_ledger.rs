//! SQLite adapter for the payment ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::foundation::{AccountId, PaymentId};
use crate::domain::subscription::{Account, Payment, ReviewStatus, SubscriptionError};
use crate::ports::PaymentLedger;

const SELECT_PAYMENT: &str =
    "SELECT id, account_id, amount, review_status, submitted_at, evidence_ref FROM payments";

pub struct SqlitePaymentLedger {
    pool: SqlitePool,
}

impl SqlitePaymentLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment, SubscriptionError> {
    let status_raw: String = row
        .try_get("review_status")
        .map_err(SubscriptionError::store)?;
    let review_status = ReviewStatus::parse(&status_raw)
        .ok_or_else(|| SubscriptionError::store(format!("unknown review status '{status_raw}'")))?;

    let id: i64 = row.try_get("id").map_err(SubscriptionError::store)?;
    let account_id: i64 = row.try_get("account_id").map_err(SubscriptionError::store)?;
    let submitted_at: DateTime<Utc> = row
        .try_get("submitted_at")
        .map_err(SubscriptionError::store)?;

    Ok(Payment {
        id: PaymentId::new(id),
        account_id: AccountId::new(account_id),
        amount: row.try_get("amount").map_err(SubscriptionError::store)?,
        review_status,
        submitted_at,
        evidence_ref: row
            .try_get("evidence_ref")
            .map_err(SubscriptionError::store)?,
    })
}

#[async_trait]
impl PaymentLedger for SqlitePaymentLedger {
    async fn submit(
        &self,
        account_id: AccountId,
        amount: i64,
        evidence_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, SubscriptionError> {
        let result = sqlx::query(
            "INSERT INTO payments (account_id, amount, review_status, submitted_at, evidence_ref) \
             VALUES (?1, ?2, 'pending', ?3, ?4)",
        )
        .bind(account_id.as_i64())
        .bind(amount)
        .bind(now)
        .bind(evidence_ref)
        .execute(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;

        let id = PaymentId::new(result.last_insert_rowid());
        Ok(Payment::submit(
            id,
            account_id,
            amount,
            evidence_ref.to_string(),
            now,
        ))
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, SubscriptionError> {
        let row = sqlx::query(&format!("{SELECT_PAYMENT} WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(SubscriptionError::store)?;
        row.as_ref().map(payment_from_row).transpose()
    }

    async fn commit_review(
        &self,
        payment: &Payment,
        account: Option<&Account>,
    ) -> Result<(), SubscriptionError> {
        let mut tx = self.pool.begin().await.map_err(SubscriptionError::store)?;

        // Compare-and-set against pending. Of two concurrent reviews of
        // one payment, the second sees zero rows here.
        let updated = sqlx::query(
            "UPDATE payments SET review_status = ?1 \
             WHERE id = ?2 AND review_status = 'pending'",
        )
        .bind(payment.review_status.as_str())
        .bind(payment.id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(SubscriptionError::store)?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE id = ?1)")
                    .bind(payment.id.as_i64())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(SubscriptionError::store)?;
            return Err(if exists {
                SubscriptionError::AlreadyReviewed(payment.id)
            } else {
                SubscriptionError::PaymentNotFound(payment.id)
            });
        }

        if let Some(account) = account {
            let result = sqlx::query(
                "UPDATE accounts SET lifecycle_status = ?1, expiry_date = ?2, \
                 warned_3 = ?3, warned_1 = ?4, total_approved_payments = ?5 WHERE id = ?6",
            )
            .bind(account.status.as_str())
            .bind(account.expiry_date)
            .bind(account.warned_3)
            .bind(account.warned_1)
            .bind(account.total_approved_payments)
            .bind(account.id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(SubscriptionError::store)?;

            // Dropping the transaction rolls the payment write back too.
            if result.rows_affected() == 0 {
                return Err(SubscriptionError::AccountNotFound(account.id));
            }
        }

        tx.commit().await.map_err(SubscriptionError::store)
    }

    async fn list_pending(&self) -> Result<Vec<Payment>, SubscriptionError> {
        let rows = sqlx::query(&format!(
            "{SELECT_PAYMENT} WHERE review_status = 'pending' ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;
        rows.iter().map(payment_from_row).collect()
    }

    async fn count_pending(&self) -> Result<i64, SubscriptionError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE review_status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(SubscriptionError::store)
    }

    async fn list_newest_first(&self) -> Result<Vec<Payment>, SubscriptionError> {
        let rows = sqlx::query(&format!("{SELECT_PAYMENT} ORDER BY id DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(SubscriptionError::store)?;
        rows.iter().map(payment_from_row).collect()
    }
}
