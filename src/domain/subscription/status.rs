//! Lifecycle and review status state machines.
//!
//! `LifecycleStatus` governs an account's access to the gated channel;
//! `ReviewStatus` governs the exactly-once resolution of a submitted
//! payment.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account lifecycle status.
///
/// Every account starts `Inactive`. Payment approval or an operator
/// action moves it to `Active`; the daily sweep demotes lapsed accounts
/// to `Expired`. `Banned` is only left by explicit operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Registered but without a subscription. No channel access.
    Inactive,

    /// Paid subscription within its validity window.
    Active,

    /// Subscription window has lapsed. No access until a new approved
    /// payment or operator action.
    Expired,

    /// Blocked by the operator. Terminal unless the operator reactivates.
    Banned,
}

impl LifecycleStatus {
    /// Returns true if this status grants access to the channel.
    pub fn has_access(&self) -> bool {
        matches!(self, LifecycleStatus::Active)
    }

    /// Storage representation, also used in operator-facing output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Inactive => "inactive",
            LifecycleStatus::Active => "active",
            LifecycleStatus::Expired => "expired",
            LifecycleStatus::Banned => "banned",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inactive" => Some(LifecycleStatus::Inactive),
            "active" => Some(LifecycleStatus::Active),
            "expired" => Some(LifecycleStatus::Expired),
            "banned" => Some(LifecycleStatus::Banned),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for LifecycleStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LifecycleStatus::*;
        matches!(
            (self, target),
            // From INACTIVE
            (Inactive, Active)
                | (Inactive, Banned)
            // From ACTIVE
                | (Active, Active) // Renewal extends the window
                | (Active, Expired) // Sweep demotion
                | (Active, Inactive) // Operator force-deactivate
                | (Active, Banned)
            // From EXPIRED
                | (Expired, Active)
                | (Expired, Inactive)
                | (Expired, Banned)
            // From BANNED (operator only)
                | (Banned, Active)
                | (Banned, Inactive)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LifecycleStatus::*;
        match self {
            Inactive => vec![Active, Banned],
            Active => vec![Active, Expired, Inactive, Banned],
            Expired => vec![Active, Inactive, Banned],
            Banned => vec![Active, Inactive],
        }
    }
}

/// Review outcome of a submitted payment.
///
/// Transitions only `Pending -> Approved` or `Pending -> Rejected`,
/// exactly once. Resolved payments are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Submitted, awaiting operator review.
    Pending,

    /// Accepted by the operator; subscription was granted.
    Approved,

    /// Declined by the operator; no account mutation.
    Rejected,
}

impl ReviewStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ReviewStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ReviewStatus::*;
        matches!((self, target), (Pending, Approved) | (Pending, Rejected))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ReviewStatus::*;
        match self {
            Pending => vec![Approved, Rejected],
            Approved => vec![],
            Rejected => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lifecycle transitions

    #[test]
    fn inactive_can_activate() {
        assert!(LifecycleStatus::Inactive.can_transition_to(&LifecycleStatus::Active));
    }

    #[test]
    fn inactive_cannot_expire() {
        assert!(!LifecycleStatus::Inactive.can_transition_to(&LifecycleStatus::Expired));
    }

    #[test]
    fn active_can_renew_to_active() {
        let result = LifecycleStatus::Active.transition_to(LifecycleStatus::Active);
        assert_eq!(result, Ok(LifecycleStatus::Active));
    }

    #[test]
    fn active_can_expire() {
        assert!(LifecycleStatus::Active.can_transition_to(&LifecycleStatus::Expired));
    }

    #[test]
    fn expired_cannot_expire_again() {
        assert!(!LifecycleStatus::Expired.can_transition_to(&LifecycleStatus::Expired));
    }

    #[test]
    fn banned_can_only_be_reactivated_or_cleared() {
        assert_eq!(
            LifecycleStatus::Banned.valid_transitions(),
            vec![LifecycleStatus::Active, LifecycleStatus::Inactive]
        );
    }

    #[test]
    fn no_lifecycle_status_is_terminal() {
        for status in [
            LifecycleStatus::Inactive,
            LifecycleStatus::Active,
            LifecycleStatus::Expired,
            LifecycleStatus::Banned,
        ] {
            assert!(!status.is_terminal(), "{:?} should have an exit", status);
        }
    }

    #[test]
    fn only_active_has_access() {
        assert!(LifecycleStatus::Active.has_access());
        assert!(!LifecycleStatus::Inactive.has_access());
        assert!(!LifecycleStatus::Expired.has_access());
        assert!(!LifecycleStatus::Banned.has_access());
    }

    #[test]
    fn lifecycle_status_parse_roundtrips() {
        for status in [
            LifecycleStatus::Inactive,
            LifecycleStatus::Active,
            LifecycleStatus::Expired,
            LifecycleStatus::Banned,
        ] {
            assert_eq!(LifecycleStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LifecycleStatus::parse("suspended"), None);
    }

    // Review transitions

    #[test]
    fn pending_can_resolve_either_way() {
        assert!(ReviewStatus::Pending.can_transition_to(&ReviewStatus::Approved));
        assert!(ReviewStatus::Pending.can_transition_to(&ReviewStatus::Rejected));
    }

    #[test]
    fn resolved_reviews_are_terminal() {
        assert!(ReviewStatus::Approved.is_terminal());
        assert!(ReviewStatus::Rejected.is_terminal());
    }

    #[test]
    fn approved_cannot_be_rejected_later() {
        assert!(ReviewStatus::Approved
            .transition_to(ReviewStatus::Rejected)
            .is_err());
    }

    #[test]
    fn review_status_parse_roundtrips() {
        for status in [ReviewStatus::Pending, ReviewStatus::Approved, ReviewStatus::Rejected] {
            assert_eq!(ReviewStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReviewStatus::parse("declined"), None);
    }
}
