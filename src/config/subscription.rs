//! Subscription policy configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Subscription period and sweep policy
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Days granted per approved payment
    #[serde(default = "default_sub_days")]
    pub sub_days: i64,

    /// Warning thresholds in days left, earlier first
    #[serde(default = "default_warn_days")]
    pub warn_days: [i64; 2],

    /// Hours between expiry sweeps
    #[serde(default = "default_sweep_interval_hours")]
    pub sweep_interval_hours: u64,
}

impl SubscriptionConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_hours * 60 * 60)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sub_days < 1 {
            return Err(ValidationError::InvalidSubscriptionDays);
        }
        let [early, late] = self.warn_days;
        if late < 1 || early <= late || early >= self.sub_days {
            return Err(ValidationError::InvalidWarnThresholds);
        }
        if self.sweep_interval_hours < 1 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            sub_days: default_sub_days(),
            warn_days: default_warn_days(),
            sweep_interval_hours: default_sweep_interval_hours(),
        }
    }
}

fn default_sub_days() -> i64 {
    30
}

fn default_warn_days() -> [i64; 2] {
    [3, 1]
}

fn default_sweep_interval_hours() -> u64 {
    24
}
