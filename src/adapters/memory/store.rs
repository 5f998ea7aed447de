//! In-memory store implementing the account, ledger and pricing ports.
//!
//! A single mutex over the whole state makes every method a transaction,
//! which is exactly what the guarded updates and `commit_review` need.
//! Used by the integration tests; production wiring uses the SQLite
//! adapter.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::foundation::{AccountId, PaymentId};
use crate::domain::subscription::{
    Account, LifecycleStatus, Payment, SubscriptionError, WarningFlag,
};
use crate::ports::{AccountRepository, PaymentLedger, PricingStore};

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    // Insertion order doubles as registration order.
    account_order: Vec<AccountId>,
    payments: BTreeMap<PaymentId, Payment>,
    next_payment_id: i64,
    price: i64,
}

/// Shared in-memory backing store.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new(default_price: i64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_payment_id: 1,
                price: default_price,
                ..Inner::default()
            }),
        }
    }

    /// Direct snapshot of an account, for test assertions.
    pub async fn account_snapshot(&self, id: AccountId) -> Option<Account> {
        self.inner.lock().await.accounts.get(&id).cloned()
    }

    /// Direct snapshot of a payment, for test assertions.
    pub async fn payment_snapshot(&self, id: PaymentId) -> Option<Payment> {
        self.inner.lock().await.payments.get(&id).cloned()
    }

    /// Seeds an account in a given state, bypassing the registration flow.
    pub async fn seed_account(&self, account: Account) {
        let mut inner = self.inner.lock().await;
        if !inner.accounts.contains_key(&account.id) {
            inner.account_order.push(account.id);
        }
        inner.accounts.insert(account.id, account);
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn upsert_on_start(
        &self,
        id: AccountId,
        display_name: &str,
        handle: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Account, SubscriptionError> {
        let mut inner = self.inner.lock().await;

        if let Some(account) = inner.accounts.get_mut(&id) {
            account.handle = handle.map(str::to_string);
            if !account.is_named() {
                account.full_name = display_name.trim().to_string();
            }
            return Ok(account.clone());
        }

        let account = Account::register(id, display_name, handle.map(str::to_string), now);
        inner.account_order.push(id);
        inner.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn find(&self, id: AccountId) -> Result<Option<Account>, SubscriptionError> {
        Ok(self.inner.lock().await.accounts.get(&id).cloned())
    }

    async fn set_full_name(&self, id: AccountId, full_name: &str) -> Result<(), SubscriptionError> {
        let mut inner = self.inner.lock().await;
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or(SubscriptionError::AccountNotFound(id))?;
        account.full_name = full_name.to_string();
        Ok(())
    }

    async fn set_phone(&self, id: AccountId, phone: &str) -> Result<(), SubscriptionError> {
        let mut inner = self.inner.lock().await;
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or(SubscriptionError::AccountNotFound(id))?;
        account.phone = Some(phone.to_string());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), SubscriptionError> {
        let mut inner = self.inner.lock().await;
        if !inner.accounts.contains_key(&account.id) {
            return Err(SubscriptionError::AccountNotFound(account.id));
        }
        inner.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn try_mark_warned(
        &self,
        id: AccountId,
        flag: WarningFlag,
    ) -> Result<bool, SubscriptionError> {
        let mut inner = self.inner.lock().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(false);
        };
        if account.status != LifecycleStatus::Active || account.is_warned(flag) {
            return Ok(false);
        }
        account.mark_warned(flag);
        Ok(true)
    }

    async fn try_expire(&self, id: AccountId) -> Result<bool, SubscriptionError> {
        let mut inner = self.inner.lock().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(false);
        };
        if account.status != LifecycleStatus::Active {
            return Ok(false);
        }
        account.expire()?;
        Ok(true)
    }

    async fn list_active_with_expiry(&self) -> Result<Vec<Account>, SubscriptionError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .account_order
            .iter()
            .filter_map(|id| inner.accounts.get(id))
            .filter(|a| a.status == LifecycleStatus::Active && a.expiry_date.is_some())
            .cloned()
            .collect())
    }

    async fn count_total(&self) -> Result<i64, SubscriptionError> {
        Ok(self.inner.lock().await.accounts.len() as i64)
    }

    async fn count_active(&self) -> Result<i64, SubscriptionError> {
        Ok(self
            .inner
            .lock()
            .await
            .accounts
            .values()
            .filter(|a| a.status == LifecycleStatus::Active)
            .count() as i64)
    }

    async fn list_newest_first(&self) -> Result<Vec<Account>, SubscriptionError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .account_order
            .iter()
            .rev()
            .filter_map(|id| inner.accounts.get(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentLedger for InMemoryStore {
    async fn submit(
        &self,
        account_id: AccountId,
        amount: i64,
        evidence_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, SubscriptionError> {
        let mut inner = self.inner.lock().await;
        let id = PaymentId::new(inner.next_payment_id);
        inner.next_payment_id += 1;

        let payment = Payment::submit(id, account_id, amount, evidence_ref.to_string(), now);
        inner.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn find(&self, id: PaymentId) -> Result<Option<Payment>, SubscriptionError> {
        Ok(self.inner.lock().await.payments.get(&id).cloned())
    }

    async fn commit_review(
        &self,
        payment: &Payment,
        account: Option<&Account>,
    ) -> Result<(), SubscriptionError> {
        // One lock for the whole decision: the pending check, the payment
        // write and the account write commit together or not at all.
        let mut inner = self.inner.lock().await;

        let stored = inner
            .payments
            .get(&payment.id)
            .ok_or(SubscriptionError::PaymentNotFound(payment.id))?;
        if !stored.is_pending() {
            return Err(SubscriptionError::AlreadyReviewed(payment.id));
        }

        inner.payments.insert(payment.id, payment.clone());
        if let Some(account) = account {
            if !inner.accounts.contains_key(&account.id) {
                return Err(SubscriptionError::AccountNotFound(account.id));
            }
            inner.accounts.insert(account.id, account.clone());
        }
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<Payment>, SubscriptionError> {
        // BTreeMap order is id order, which is submission order.
        Ok(self
            .inner
            .lock()
            .await
            .payments
            .values()
            .filter(|p| p.is_pending())
            .cloned()
            .collect())
    }

    async fn count_pending(&self) -> Result<i64, SubscriptionError> {
        Ok(self
            .inner
            .lock()
            .await
            .payments
            .values()
            .filter(|p| p.is_pending())
            .count() as i64)
    }

    async fn list_newest_first(&self) -> Result<Vec<Payment>, SubscriptionError> {
        Ok(self
            .inner
            .lock()
            .await
            .payments
            .values()
            .rev()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PricingStore for InMemoryStore {
    async fn current_price(&self) -> Result<i64, SubscriptionError> {
        Ok(self.inner.lock().await.price)
    }

    async fn set_price(&self, price: i64) -> Result<(), SubscriptionError> {
        self.inner.lock().await.price = price;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[tokio::test]
    async fn upsert_creates_then_refreshes() {
        let store = InMemoryStore::new(30_000);
        let first = store
            .upsert_on_start(AccountId::new(1), "Ali", Some("ali"), now())
            .await
            .unwrap();
        assert_eq!(first.full_name, "Ali");

        let second = store
            .upsert_on_start(AccountId::new(1), "Ali Valiyev", None, now())
            .await
            .unwrap();
        assert_eq!(second.full_name, "Ali Valiyev");
        assert_eq!(second.handle, None);
        assert_eq!(store.count_total().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_keeps_a_proper_full_name() {
        let store = InMemoryStore::new(30_000);
        store
            .upsert_on_start(AccountId::new(1), "Ali Valiyev", None, now())
            .await
            .unwrap();

        let again = store
            .upsert_on_start(AccountId::new(1), "Ali", None, now())
            .await
            .unwrap();
        assert_eq!(again.full_name, "Ali Valiyev");
    }

    #[tokio::test]
    async fn payment_ids_are_sequential() {
        let store = InMemoryStore::new(30_000);
        let a = store
            .submit(AccountId::new(1), 100, "f1", now())
            .await
            .unwrap();
        let b = store
            .submit(AccountId::new(1), 100, "f2", now())
            .await
            .unwrap();
        assert_eq!(a.id, PaymentId::new(1));
        assert_eq!(b.id, PaymentId::new(2));
    }

    #[tokio::test]
    async fn commit_review_is_exactly_once() {
        let store = InMemoryStore::new(30_000);
        let mut payment = store
            .submit(AccountId::new(1), 100, "f1", now())
            .await
            .unwrap();
        payment.reject().unwrap();

        store.commit_review(&payment, None).await.unwrap();
        let second = store.commit_review(&payment, None).await;
        assert_eq!(
            second,
            Err(SubscriptionError::AlreadyReviewed(payment.id))
        );
    }

    #[tokio::test]
    async fn try_mark_warned_fires_once() {
        let store = InMemoryStore::new(30_000);
        let mut account = Account::register(AccountId::new(5), "Ali Valiyev", None, now());
        account
            .record_approval(now().date_naive(), 30)
            .unwrap();
        store.seed_account(account).await;

        assert!(store
            .try_mark_warned(AccountId::new(5), WarningFlag::ThreeDay)
            .await
            .unwrap());
        assert!(!store
            .try_mark_warned(AccountId::new(5), WarningFlag::ThreeDay)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn try_expire_only_demotes_active_accounts() {
        let store = InMemoryStore::new(30_000);
        let account = Account::register(AccountId::new(6), "Ali Valiyev", None, now());
        store.seed_account(account).await;

        assert!(!store.try_expire(AccountId::new(6)).await.unwrap());
        assert!(!store.try_expire(AccountId::new(999)).await.unwrap());
    }

    #[tokio::test]
    async fn pending_list_is_oldest_first() {
        let store = InMemoryStore::new(30_000);
        store.submit(AccountId::new(1), 100, "f1", now()).await.unwrap();
        store.submit(AccountId::new(2), 100, "f2", now()).await.unwrap();

        let pending = store.list_pending().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, PaymentId::new(1));
        assert_eq!(pending[1].id, PaymentId::new(2));
    }
}
