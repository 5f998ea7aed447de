//! SQLite adapter for the account repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::domain::foundation::AccountId;
use crate::domain::subscription::{
    Account, LifecycleStatus, SubscriptionError, WarningFlag,
};
use crate::ports::AccountRepository;

const SELECT_ACCOUNT: &str = "SELECT id, full_name, handle, phone, lifecycle_status, \
     expiry_date, warned_3, warned_1, total_approved_payments, created_at FROM accounts";

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &SqliteRow) -> Result<Account, SubscriptionError> {
    let status_raw: String = row
        .try_get("lifecycle_status")
        .map_err(SubscriptionError::store)?;
    let status = LifecycleStatus::parse(&status_raw).ok_or_else(|| {
        SubscriptionError::store(format!("unknown lifecycle status '{status_raw}'"))
    })?;

    let id: i64 = row.try_get("id").map_err(SubscriptionError::store)?;
    let expiry_date: Option<NaiveDate> = row
        .try_get("expiry_date")
        .map_err(SubscriptionError::store)?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(SubscriptionError::store)?;

    Ok(Account {
        id: AccountId::new(id),
        full_name: row.try_get("full_name").map_err(SubscriptionError::store)?,
        handle: row.try_get("handle").map_err(SubscriptionError::store)?,
        phone: row.try_get("phone").map_err(SubscriptionError::store)?,
        status,
        expiry_date,
        warned_3: row.try_get("warned_3").map_err(SubscriptionError::store)?,
        warned_1: row.try_get("warned_1").map_err(SubscriptionError::store)?,
        total_approved_payments: row
            .try_get("total_approved_payments")
            .map_err(SubscriptionError::store)?,
        created_at,
    })
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn upsert_on_start(
        &self,
        id: AccountId,
        display_name: &str,
        handle: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Account, SubscriptionError> {
        let mut tx = self.pool.begin().await.map_err(SubscriptionError::store)?;

        let existing = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(SubscriptionError::store)?;

        let account = if let Some(row) = existing {
            let mut account = account_from_row(&row)?;
            account.handle = handle.map(str::to_string);
            if !account.is_named() {
                account.full_name = display_name.trim().to_string();
            }

            sqlx::query("UPDATE accounts SET full_name = ?1, handle = ?2 WHERE id = ?3")
                .bind(&account.full_name)
                .bind(&account.handle)
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(SubscriptionError::store)?;
            account
        } else {
            let account = Account::register(id, display_name, handle.map(str::to_string), now);
            sqlx::query(
                "INSERT INTO accounts \
                 (id, full_name, handle, phone, lifecycle_status, expiry_date, \
                  warned_3, warned_1, total_approved_payments, created_at) \
                 VALUES (?1, ?2, ?3, NULL, ?4, NULL, 0, 0, 0, ?5)",
            )
            .bind(id.as_i64())
            .bind(&account.full_name)
            .bind(&account.handle)
            .bind(account.status.as_str())
            .bind(account.created_at)
            .execute(&mut *tx)
            .await
            .map_err(SubscriptionError::store)?;
            account
        };

        tx.commit().await.map_err(SubscriptionError::store)?;
        Ok(account)
    }

    async fn find(&self, id: AccountId) -> Result<Option<Account>, SubscriptionError> {
        let row = sqlx::query(&format!("{SELECT_ACCOUNT} WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(SubscriptionError::store)?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn set_full_name(&self, id: AccountId, full_name: &str) -> Result<(), SubscriptionError> {
        let result = sqlx::query("UPDATE accounts SET full_name = ?1 WHERE id = ?2")
            .bind(full_name)
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(SubscriptionError::store)?;
        if result.rows_affected() == 0 {
            return Err(SubscriptionError::AccountNotFound(id));
        }
        Ok(())
    }

    async fn set_phone(&self, id: AccountId, phone: &str) -> Result<(), SubscriptionError> {
        let result = sqlx::query("UPDATE accounts SET phone = ?1 WHERE id = ?2")
            .bind(phone)
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(SubscriptionError::store)?;
        if result.rows_affected() == 0 {
            return Err(SubscriptionError::AccountNotFound(id));
        }
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), SubscriptionError> {
        let result = sqlx::query(
            "UPDATE accounts SET full_name = ?1, handle = ?2, phone = ?3, \
             lifecycle_status = ?4, expiry_date = ?5, warned_3 = ?6, warned_1 = ?7, \
             total_approved_payments = ?8 WHERE id = ?9",
        )
        .bind(&account.full_name)
        .bind(&account.handle)
        .bind(&account.phone)
        .bind(account.status.as_str())
        .bind(account.expiry_date)
        .bind(account.warned_3)
        .bind(account.warned_1)
        .bind(account.total_approved_payments)
        .bind(account.id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::AccountNotFound(account.id));
        }
        Ok(())
    }

    async fn try_mark_warned(
        &self,
        id: AccountId,
        flag: WarningFlag,
    ) -> Result<bool, SubscriptionError> {
        let column = match flag {
            WarningFlag::ThreeDay => "warned_3",
            WarningFlag::OneDay => "warned_1",
        };
        // The WHERE clause is the guard: only an active, not-yet-warned
        // account matches, so exactly one caller wins.
        let result = sqlx::query(&format!(
            "UPDATE accounts SET {column} = 1 \
             WHERE id = ?1 AND {column} = 0 AND lifecycle_status = 'active'"
        ))
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;

        Ok(result.rows_affected() == 1)
    }

    async fn try_expire(&self, id: AccountId) -> Result<bool, SubscriptionError> {
        let result = sqlx::query(
            "UPDATE accounts SET lifecycle_status = 'expired' \
             WHERE id = ?1 AND lifecycle_status = 'active'",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_active_with_expiry(&self) -> Result<Vec<Account>, SubscriptionError> {
        let rows = sqlx::query(&format!(
            "{SELECT_ACCOUNT} WHERE lifecycle_status = 'active' \
             AND expiry_date IS NOT NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;
        rows.iter().map(account_from_row).collect()
    }

    async fn count_total(&self) -> Result<i64, SubscriptionError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(SubscriptionError::store)
    }

    async fn count_active(&self) -> Result<i64, SubscriptionError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE lifecycle_status = 'active'")
            .fetch_one(&self.pool)
            .await
            .map_err(SubscriptionError::store)
    }

    async fn list_newest_first(&self) -> Result<Vec<Account>, SubscriptionError> {
        let rows = sqlx::query(&format!(
            "{SELECT_ACCOUNT} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(SubscriptionError::store)?;
        rows.iter().map(account_from_row).collect()
    }
}
