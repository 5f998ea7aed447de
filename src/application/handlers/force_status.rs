//! Operator force transitions.
//!
//! Direct activation and deactivation regardless of prior state. The
//! account update commits first; the courtesy notification to the user
//! is best-effort (the original motivation: the user may have blocked
//! the bot, which must not fail the operator's action).

use std::sync::Arc;

use crate::application::locks::AccountLocks;
use crate::domain::foundation::AccountId;
use crate::domain::subscription::{Account, SubscriptionError};
use crate::ports::{AccountRepository, Choice, ChoiceAction, Clock, Notifier};

use super::swallow_delivery;

/// Handles operator force-activate / force-deactivate.
pub struct ForceStatusHandler {
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    locks: Arc<AccountLocks>,
    sub_days: i64,
}

impl ForceStatusHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        locks: Arc<AccountLocks>,
        sub_days: i64,
    ) -> Self {
        Self {
            accounts,
            notifier,
            clock,
            locks,
            sub_days,
        }
    }

    /// Grants a fresh window from today.
    pub async fn activate(&self, target: AccountId) -> Result<Account, SubscriptionError> {
        let guard = self.locks.acquire(target).await;
        let mut account = self
            .accounts
            .find(target)
            .await?
            .ok_or(SubscriptionError::AccountNotFound(target))?;

        account.force_activate(self.clock.today(), self.sub_days)?;
        self.accounts.update(&account).await?;
        drop(guard);

        tracing::info!(account_id = %target, "account force-activated by operator");

        swallow_delivery(
            self.notifier
                .send_text(target, "Your subscription was activated by the operator.")
                .await,
            "force-activate notification",
        );
        swallow_delivery(
            self.notifier
                .send_choices(
                    target,
                    "Join the channel:",
                    &[Choice::new("Open channel", ChoiceAction::ChannelInvite)],
                )
                .await,
            "force-activate channel invite",
        );

        Ok(account)
    }

    /// Drops the subscription window.
    pub async fn deactivate(&self, target: AccountId) -> Result<Account, SubscriptionError> {
        let guard = self.locks.acquire(target).await;
        let mut account = self
            .accounts
            .find(target)
            .await?
            .ok_or(SubscriptionError::AccountNotFound(target))?;

        account.force_deactivate()?;
        self.accounts.update(&account).await?;
        drop(guard);

        tracing::info!(account_id = %target, "account force-deactivated by operator");

        swallow_delivery(
            self.notifier
                .send_text(target, "Your subscription was removed by the operator.")
                .await,
            "force-deactivate notification",
        );

        Ok(account)
    }
}
