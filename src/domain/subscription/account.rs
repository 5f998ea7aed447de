//! Account aggregate.
//!
//! One account per end user, created on first contact and never deleted.
//! Identity fields (name, handle, phone) are filled in incrementally;
//! the lifecycle fields are only mutated through the methods here so the
//! expiry/status invariant cannot be broken from outside.
//!
//! # Invariants
//!
//! - `expiry_date` is non-null iff `status` is `Active` or `Expired`.
//! - Approval clears both warning flags (a fresh period starts un-warned)
//!   and increments the payment counter.
//! - `total_approved_payments` never decreases.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, StateMachine, ValidationError};

use super::{LifecycleStatus, SubscriptionError};

/// Which expiry warning a flag tracks.
///
/// The flags are period-scoped: approval resets both, so each fires at
/// most once per subscription period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningFlag {
    /// The earlier "renew soon" reminder (default: 3 days left).
    ThreeDay,
    /// The final reminder (default: 1 day left).
    OneDay,
}

/// A registered end user and their subscription lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Platform user id, stable primary key.
    pub id: AccountId,

    /// Self-reported full name. The account counts as "named" only once
    /// this holds at least two whitespace-separated tokens.
    pub full_name: String,

    /// Platform handle (username), if the user has one.
    pub handle: Option<String>,

    /// Contact phone, set once the user shares it.
    pub phone: Option<String>,

    /// Current lifecycle status.
    pub status: LifecycleStatus,

    /// End of the subscription window. Present iff status is
    /// `Active` or `Expired`.
    pub expiry_date: Option<NaiveDate>,

    /// Whether the 3-day warning was sent for the current period.
    pub warned_3: bool,

    /// Whether the 1-day warning was sent for the current period.
    pub warned_1: bool,

    /// Count of approved payments, monotonically non-decreasing.
    pub total_approved_payments: i64,

    /// When the account was first seen.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a fresh account on first contact.
    ///
    /// `display_name` is whatever the platform reports; it may well be a
    /// single token, in which case the registration flow asks for a
    /// proper full name before anything else.
    pub fn register(
        id: AccountId,
        display_name: &str,
        handle: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            full_name: display_name.trim().to_string(),
            handle,
            phone: None,
            status: LifecycleStatus::Inactive,
            expiry_date: None,
            warned_3: false,
            warned_1: false,
            total_approved_payments: 0,
            created_at,
        }
    }

    /// True once the stored name has at least two tokens.
    pub fn is_named(&self) -> bool {
        self.full_name.split_whitespace().count() >= 2
    }

    /// Validates and stores a user-supplied full name.
    pub fn set_full_name(&mut self, name: &str) -> Result<(), ValidationError> {
        let trimmed = name.trim();
        if trimmed.split_whitespace().count() < 2 {
            return Err(ValidationError::invalid_format(
                "full_name",
                "need both a name and a surname",
            ));
        }
        self.full_name = trimmed.to_string();
        Ok(())
    }

    /// Days until expiry relative to `today`. Negative once lapsed,
    /// `None` when no subscription window exists.
    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| (expiry - today).num_days())
    }

    /// True if the account is active and the window covers `today`.
    pub fn has_access(&self, today: NaiveDate) -> bool {
        self.status.has_access() && self.days_left(today).map_or(false, |d| d >= 0)
    }

    /// Applies an approved payment: the new window extends from the
    /// current expiry when it is still in the future, otherwise from
    /// today.
    pub fn record_approval(
        &mut self,
        today: NaiveDate,
        sub_days: i64,
    ) -> Result<(), SubscriptionError> {
        self.status = self.status.transition_to(LifecycleStatus::Active)?;

        let base = match self.expiry_date {
            Some(expiry) if expiry >= today => expiry,
            _ => today,
        };
        self.expiry_date = Some(base + chrono::Duration::days(sub_days));
        self.warned_3 = false;
        self.warned_1 = false;
        self.total_approved_payments += 1;

        debug_assert!(self.invariants_hold());
        Ok(())
    }

    /// Operator force-activation: a fresh window from today, regardless
    /// of prior state.
    pub fn force_activate(
        &mut self,
        today: NaiveDate,
        sub_days: i64,
    ) -> Result<(), SubscriptionError> {
        self.status = self.status.transition_to(LifecycleStatus::Active)?;
        self.expiry_date = Some(today + chrono::Duration::days(sub_days));
        self.warned_3 = false;
        self.warned_1 = false;

        debug_assert!(self.invariants_hold());
        Ok(())
    }

    /// Operator force-deactivation: drops the subscription window and
    /// resets the warning flags.
    pub fn force_deactivate(&mut self) -> Result<(), SubscriptionError> {
        if self.status != LifecycleStatus::Inactive {
            self.status = self.status.transition_to(LifecycleStatus::Inactive)?;
        }
        self.expiry_date = None;
        self.warned_3 = false;
        self.warned_1 = false;

        debug_assert!(self.invariants_hold());
        Ok(())
    }

    /// Sweep demotion for a lapsed window. The expiry date is kept so an
    /// expired account still shows when its access ended.
    pub fn expire(&mut self) -> Result<(), SubscriptionError> {
        self.status = self.status.transition_to(LifecycleStatus::Expired)?;

        debug_assert!(self.invariants_hold());
        Ok(())
    }

    /// Whether the given warning was already sent this period.
    pub fn is_warned(&self, flag: WarningFlag) -> bool {
        match flag {
            WarningFlag::ThreeDay => self.warned_3,
            WarningFlag::OneDay => self.warned_1,
        }
    }

    /// Records that the given warning was sent.
    pub fn mark_warned(&mut self, flag: WarningFlag) {
        match flag {
            WarningFlag::ThreeDay => self.warned_3 = true,
            WarningFlag::OneDay => self.warned_1 = true,
        }
    }

    /// The expiry/status invariant, checked after every transition.
    pub fn invariants_hold(&self) -> bool {
        let needs_expiry = matches!(
            self.status,
            LifecycleStatus::Active | LifecycleStatus::Expired
        );
        self.expiry_date.is_some() == needs_expiry && self.total_approved_payments >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn new_account() -> Account {
        Account::register(AccountId::new(100), "Ali Valiyev", None, Utc::now())
    }

    #[test]
    fn register_starts_inactive_without_expiry() {
        let account = new_account();
        assert_eq!(account.status, LifecycleStatus::Inactive);
        assert!(account.expiry_date.is_none());
        assert_eq!(account.total_approved_payments, 0);
        assert!(account.invariants_hold());
    }

    #[test]
    fn single_token_display_name_is_not_named() {
        let account = Account::register(AccountId::new(1), "Ali", None, Utc::now());
        assert!(!account.is_named());
    }

    #[test]
    fn set_full_name_requires_two_tokens() {
        let mut account = new_account();
        assert!(account.set_full_name("Ali").is_err());
        assert!(account.set_full_name("   ").is_err());
        assert!(account.set_full_name("Ali Valiyev").is_ok());
        assert_eq!(account.full_name, "Ali Valiyev");
    }

    #[test]
    fn first_approval_starts_window_from_today() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();

        assert_eq!(account.status, LifecycleStatus::Active);
        assert_eq!(account.expiry_date, Some(today() + chrono::Duration::days(30)));
        assert_eq!(account.total_approved_payments, 1);
        assert!(!account.warned_3);
        assert!(!account.warned_1);
    }

    #[test]
    fn approval_extends_from_future_expiry() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        account.expiry_date = Some(today() + chrono::Duration::days(10));

        account.record_approval(today(), 30).unwrap();
        assert_eq!(account.expiry_date, Some(today() + chrono::Duration::days(40)));
        assert_eq!(account.total_approved_payments, 2);
    }

    #[test]
    fn approval_of_expired_account_starts_from_today() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        account.expiry_date = Some(today() - chrono::Duration::days(5));
        account.expire().unwrap();

        account.record_approval(today(), 30).unwrap();
        assert_eq!(account.status, LifecycleStatus::Active);
        assert_eq!(account.expiry_date, Some(today() + chrono::Duration::days(30)));
    }

    #[test]
    fn approval_clears_warning_flags() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        account.mark_warned(WarningFlag::ThreeDay);
        account.mark_warned(WarningFlag::OneDay);

        account.record_approval(today(), 30).unwrap();
        assert!(!account.warned_3);
        assert!(!account.warned_1);
    }

    #[test]
    fn force_activate_ignores_prior_expiry() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        // Window still has 30 days, force-activate restarts from today.
        account.force_activate(today() + chrono::Duration::days(5), 30).unwrap();
        assert_eq!(
            account.expiry_date,
            Some(today() + chrono::Duration::days(35))
        );
    }

    #[test]
    fn force_activate_leaves_counter_alone() {
        let mut account = new_account();
        account.force_activate(today(), 30).unwrap();
        assert_eq!(account.total_approved_payments, 0);
    }

    #[test]
    fn force_deactivate_clears_window_and_flags() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        account.mark_warned(WarningFlag::ThreeDay);

        account.force_deactivate().unwrap();
        assert_eq!(account.status, LifecycleStatus::Inactive);
        assert!(account.expiry_date.is_none());
        assert!(!account.warned_3);
        assert!(!account.warned_1);
        assert!(account.invariants_hold());
    }

    #[test]
    fn force_deactivate_is_safe_on_inactive_account() {
        let mut account = new_account();
        assert!(account.force_deactivate().is_ok());
        assert_eq!(account.status, LifecycleStatus::Inactive);
    }

    #[test]
    fn expire_keeps_expiry_date() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        let expiry = account.expiry_date;

        account.expire().unwrap();
        assert_eq!(account.status, LifecycleStatus::Expired);
        assert_eq!(account.expiry_date, expiry);
        assert!(account.invariants_hold());
    }

    #[test]
    fn expire_fails_for_inactive_account() {
        let mut account = new_account();
        assert!(account.expire().is_err());
    }

    #[test]
    fn days_left_goes_negative_after_lapse() {
        let mut account = new_account();
        account.record_approval(today(), 30).unwrap();
        account.expiry_date = Some(today() - chrono::Duration::days(1));
        assert_eq!(account.days_left(today()), Some(-1));
        assert!(!account.has_access(today()));
    }

    #[test]
    fn has_access_only_within_window() {
        let mut account = new_account();
        assert!(!account.has_access(today()));
        account.record_approval(today(), 30).unwrap();
        assert!(account.has_access(today()));
    }
}
