//! Channel Gate - Subscription gatekeeper bot for a paid Telegram channel
//!
//! Members register, submit payment receipts as photos, and the single
//! operator approves or rejects them. Approved payments open a 30-day
//! access window; a daily sweep warns before expiry and demotes lapsed
//! accounts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
