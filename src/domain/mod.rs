//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, errors, state machine trait)
//! - `subscription` - Account lifecycle, payment review, and access control

pub mod foundation;
pub mod subscription;
