//! Per-account write serialization.
//!
//! A state-changing operation on an account is a read, a domain
//! transition, then a write of the resulting values. Two such sequences
//! interleaving on the same account would both compute from the same
//! snapshot and the later write would lose the earlier one (a dropped
//! counter increment, a window that fails to extend). Callers hold the
//! guard from the read until the commit; operations on distinct
//! accounts never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::AccountId;

/// Lazily created, per-account async locks.
#[derive(Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the write lock for one account, creating it on first use.
    pub async fn acquire(&self, id: AccountId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }
}
