//! In-memory adapters: a transactional store and test doubles for the
//! clock and the notifier.

mod clock;
mod notifier;
mod store;

pub use clock::FixedClock;
pub use notifier::{RecordingNotifier, SentItem};
pub use store::InMemoryStore;
