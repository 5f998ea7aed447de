//! Typed inbound events.
//!
//! The gateway adapter decodes platform updates into these variants
//! exactly once at the boundary. In particular the composite review
//! choice token (action plus payment id) arrives here already tagged;
//! nothing deeper in the engine re-parses strings.

use crate::domain::foundation::AccountId;

/// A decoded review choice selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceToken {
    Approve(crate::domain::foundation::PaymentId),
    Reject(crate::domain::foundation::PaymentId),
}

/// A recognized menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    // End-user menu
    Profile,
    BuySubscription,
    ChannelLink,
    Support,
    Help,

    // Operator panel
    Stats,
    Export,
    ChangePrice,
    Activate,
    Deactivate,
    PendingList,
    ExitPanel,
}

impl MenuCommand {
    /// True for selections only the operator may use.
    pub fn requires_operator(&self) -> bool {
        matches!(
            self,
            MenuCommand::Stats
                | MenuCommand::Export
                | MenuCommand::ChangePrice
                | MenuCommand::Activate
                | MenuCommand::Deactivate
                | MenuCommand::PendingList
                | MenuCommand::ExitPanel
        )
    }
}

/// One inbound unit of work from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `/start`, the registration entry point.
    Start {
        display_name: String,
        handle: Option<String>,
    },

    /// `/admin`, opens the operator panel.
    OperatorPanel,

    /// A recognized menu selection.
    Menu(MenuCommand),

    /// The user shared a contact. `owner_id` is the platform's claim of
    /// who the contact belongs to, when it carries one.
    ContactShared {
        phone: String,
        owner_id: Option<AccountId>,
    },

    /// The user submitted a photo as payment evidence.
    PhotoSubmitted { evidence_ref: String },

    /// Free text, routed by the pending conversation wait if any.
    Text(String),

    /// A decoded choice selection.
    Choice(ChoiceToken),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_commands_are_flagged() {
        assert!(MenuCommand::Stats.requires_operator());
        assert!(MenuCommand::PendingList.requires_operator());
        assert!(!MenuCommand::Profile.requires_operator());
        assert!(!MenuCommand::Help.requires_operator());
    }
}
