//! Account repository port.
//!
//! Persistence contract for the `Account` aggregate. Implementations
//! must serialize state-changing operations per account (single-writer
//! transactions) and keep the guarded flag/status updates atomic; the
//! sweep relies on them to make each account's mutation independently
//! committed.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::foundation::AccountId;
use crate::domain::subscription::{Account, SubscriptionError, WarningFlag};

/// Repository port for Account persistence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Creates the account on first contact, or refreshes identity
    /// fields on a repeat `/start`.
    ///
    /// The platform handle is always refreshed; a stored full name that
    /// already passes the two-token check is never overwritten by the
    /// platform display name.
    async fn upsert_on_start(
        &self,
        id: AccountId,
        display_name: &str,
        handle: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Account, SubscriptionError>;

    /// Finds an account by id. Returns `None` if unknown.
    async fn find(&self, id: AccountId) -> Result<Option<Account>, SubscriptionError>;

    /// Stores a validated full name.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the id is unknown.
    async fn set_full_name(&self, id: AccountId, full_name: &str) -> Result<(), SubscriptionError>;

    /// Stores the shared contact phone.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the id is unknown.
    async fn set_phone(&self, id: AccountId, phone: &str) -> Result<(), SubscriptionError>;

    /// Writes back a mutated aggregate (status, expiry, flags, counter).
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the id is unknown.
    async fn update(&self, account: &Account) -> Result<(), SubscriptionError>;

    /// Guarded flag write: sets the warning flag iff the account is
    /// still active and the flag is unset. Returns `true` when this
    /// call set it; the caller sends the warning only in that case.
    async fn try_mark_warned(
        &self,
        id: AccountId,
        flag: WarningFlag,
    ) -> Result<bool, SubscriptionError>;

    /// Guarded demotion: moves an active account to expired. Returns
    /// `true` when this call performed the transition.
    async fn try_expire(&self, id: AccountId) -> Result<bool, SubscriptionError>;

    /// Accounts the sweep scans: status active with a subscription
    /// window present.
    async fn list_active_with_expiry(&self) -> Result<Vec<Account>, SubscriptionError>;

    /// Total registered accounts.
    async fn count_total(&self) -> Result<i64, SubscriptionError>;

    /// Accounts currently in status active.
    async fn count_active(&self) -> Result<i64, SubscriptionError>;

    /// Every account, newest first, for the export artifact.
    async fn list_newest_first(&self) -> Result<Vec<Account>, SubscriptionError>;
}
