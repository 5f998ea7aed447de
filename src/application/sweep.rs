//! Expiry sweep, the recurring background job.
//!
//! Once per interval it scans every active account with a subscription
//! window, sends the 3-day and 1-day warnings, and demotes lapsed
//! accounts to expired. Each account's mutation is committed on its own
//! (guarded flag/status updates), so a crash mid-scan only reprocesses
//! accounts not yet updated for the day, and one account's failure never
//! aborts the rest.
//!
//! Thresholds match by exact equality, not `<=`: a sweep skipped for a
//! whole day misses that warning. Deliberately kept that way.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time;

use crate::domain::subscription::{Account, SubscriptionError, WarningFlag};
use crate::ports::{AccountRepository, Clock, Notifier};

use super::handlers::swallow_delivery;

/// Sweep configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between scans.
    pub interval: Duration,

    /// Warning thresholds in days left. The first maps to the 3-day
    /// flag, the second to the 1-day flag.
    pub warn_days: [i64; 2],
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            warn_days: [3, 1],
        }
    }
}

/// What one scan did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Warnings actually sent (flag newly set).
    pub warned: usize,
    /// Accounts demoted to expired.
    pub expired: usize,
    /// Accounts whose processing failed (logged, skipped).
    pub failures: usize,
    /// True when the scan was skipped because another was running.
    pub skipped: bool,
}

/// The background sweep service.
pub struct ExpirySweep {
    accounts: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
    // Held for the duration of a scan; an overlapping tick skips.
    running: Mutex<()>,
}

impl ExpirySweep {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: SweepConfig,
    ) -> Self {
        Self {
            accounts,
            notifier,
            clock,
            config,
            running: Mutex::new(()),
        }
    }

    /// Runs the sweep loop until the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("expiry sweep stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(report) => {
                            tracing::info!(
                                warned = report.warned,
                                expired = report.expired,
                                failures = report.failures,
                                "expiry sweep completed"
                            );
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "expiry sweep scan failed");
                        }
                    }
                }
            }
        }
    }

    /// Runs exactly one scan. Skips cleanly if another scan is running.
    pub async fn run_once(&self) -> Result<SweepReport, SubscriptionError> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("expiry sweep tick overlapped a running scan, skipping");
            return Ok(SweepReport {
                skipped: true,
                ..SweepReport::default()
            });
        };

        let today = self.clock.today();
        let accounts = self.accounts.list_active_with_expiry().await?;
        let mut report = SweepReport::default();

        for account in accounts {
            if let Err(err) = self.process_account(&account, today, &mut report).await {
                tracing::error!(
                    account_id = %account.id,
                    error = %err,
                    "sweep processing failed for account"
                );
                report.failures += 1;
            }
        }

        Ok(report)
    }

    async fn process_account(
        &self,
        account: &Account,
        today: chrono::NaiveDate,
        report: &mut SweepReport,
    ) -> Result<(), SubscriptionError> {
        let Some(days_left) = account.days_left(today) else {
            return Ok(());
        };

        if days_left == self.config.warn_days[0] {
            self.warn(account, days_left, WarningFlag::ThreeDay, report)
                .await
        } else if days_left == self.config.warn_days[1] {
            self.warn(account, days_left, WarningFlag::OneDay, report)
                .await
        } else if days_left < 0 {
            if self.accounts.try_expire(account.id).await? {
                tracing::info!(
                    account_id = %account.id,
                    days_left,
                    "subscription lapsed, account expired"
                );
                report.expired += 1;
            }
            Ok(())
        } else {
            Ok(())
        }
    }

    /// Sets the warning flag (guarded, committed on its own) and only
    /// then attempts delivery. A blocked user costs nothing but a log
    /// line; the flag keeps the warning once-per-period.
    async fn warn(
        &self,
        account: &Account,
        days_left: i64,
        flag: WarningFlag,
        report: &mut SweepReport,
    ) -> Result<(), SubscriptionError> {
        if !self.accounts.try_mark_warned(account.id, flag).await? {
            return Ok(());
        }

        tracing::info!(account_id = %account.id, days_left, "expiry warning issued");
        swallow_delivery(
            self.notifier
                .send_text(
                    account.id,
                    &format!(
                        "Your subscription expires in {} day(s). Renew to keep access!",
                        days_left
                    ),
                )
                .await,
            "expiry warning",
        );
        report.warned += 1;
        Ok(())
    }
}
