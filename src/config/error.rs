//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool size must be between 1 and 100")]
    InvalidPoolSize,

    #[error("Operator id must be a positive platform user id")]
    InvalidOperatorId,

    #[error("Channel invite URL must be an https link")]
    InvalidInviteUrl,

    #[error("Subscription length must be at least one day")]
    InvalidSubscriptionDays,

    #[error("Warning thresholds must be positive, descending and inside the period")]
    InvalidWarnThresholds,

    #[error("Sweep interval must be at least one hour")]
    InvalidSweepInterval,
}
