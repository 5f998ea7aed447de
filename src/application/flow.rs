//! Conversation flow table.
//!
//! A per-user, single-slot waiting state: at most one pending "expected
//! next input" per user, held in ephemeral memory. Entering a wait
//! replaces any prior wait (last request wins); resolving clears the
//! slot; invalid input re-prompts without clearing. Nothing here is
//! persisted; after a restart a prompt is simply re-issued.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::foundation::AccountId;

/// The kind of input a user's next free-text message is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    /// Registration: a full name with at least two tokens.
    FullName,
    /// Operator: a new positive-integer price.
    NewPrice,
    /// Operator: target account id for force-activation.
    ActivateTarget,
    /// Operator: target account id for force-deactivation.
    DeactivateTarget,
}

impl PendingInput {
    /// Waits that must re-check the caller's identity on every message,
    /// not only at entry, since the slot survives across turns.
    pub fn requires_operator(&self) -> bool {
        matches!(
            self,
            PendingInput::NewPrice | PendingInput::ActivateTarget | PendingInput::DeactivateTarget
        )
    }
}

/// The single-slot wait table.
#[derive(Debug, Default)]
pub struct ConversationFlow {
    slots: RwLock<HashMap<AccountId, PendingInput>>,
}

impl ConversationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected next input for a user, replacing any prior wait.
    pub async fn expect(&self, user: AccountId, input: PendingInput) {
        self.slots.write().await.insert(user, input);
    }

    /// The user's current wait, if any.
    pub async fn current(&self, user: AccountId) -> Option<PendingInput> {
        self.slots.read().await.get(&user).copied()
    }

    /// Clears the user's wait, returning what it was.
    pub async fn clear(&self, user: AccountId) -> Option<PendingInput> {
        self.slots.write().await.remove(&user)
    }
}
