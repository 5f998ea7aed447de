//! Application layer: dispatching, command handlers, conversation flow
//! and the background expiry sweep. Everything here talks to the domain
//! through the ports, never to a concrete store or gateway.

pub mod command;
pub mod dispatcher;
pub mod flow;
pub mod handlers;
pub mod locks;
pub mod sweep;

pub use command::{ChoiceToken, InboundEvent, MenuCommand};
pub use dispatcher::Dispatcher;
pub use flow::{ConversationFlow, PendingInput};
pub use locks::AccountLocks;
pub use sweep::{ExpirySweep, SweepConfig, SweepReport};
