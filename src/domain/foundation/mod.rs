//! Shared domain primitives: identifiers, validation errors, and the
//! state machine trait implemented by the lifecycle status enums.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::{AccountId, PaymentId};
pub use state_machine::StateMachine;
