//! Adapters: concrete implementations of the ports.

pub mod export;
pub mod memory;
pub mod sqlite;
pub mod telegram;
