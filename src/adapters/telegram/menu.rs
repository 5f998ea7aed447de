//! Keyboard layouts and the label/callback codecs.
//!
//! The engine deals in logical menus and choice tokens; this module is
//! the single place that maps them to button labels and callback data,
//! in both directions.

use crate::application::{ChoiceToken, MenuCommand};
use crate::domain::foundation::PaymentId;
use crate::ports::{ChoiceAction, MenuKind};

use super::api::{KeyboardButton, ReplyKeyboardMarkup};

pub(super) const BTN_PROFILE: &str = "👤 My profile";
pub(super) const BTN_BUY: &str = "💳 Buy subscription";
pub(super) const BTN_CHANNEL: &str = "🔗 Channel link";
pub(super) const BTN_SHARE_PHONE: &str = "📱 Share phone number";
pub(super) const BTN_SUPPORT: &str = "🆘 Support";
pub(super) const BTN_HELP: &str = "ℹ️ Help";

pub(super) const BTN_STATS: &str = "📊 Statistics";
pub(super) const BTN_EXPORT: &str = "📤 Export";
pub(super) const BTN_CHANGE_PRICE: &str = "💰 Change price";
pub(super) const BTN_ACTIVATE: &str = "✅ Activate user";
pub(super) const BTN_DEACTIVATE: &str = "🚫 Deactivate user";
pub(super) const BTN_PENDING: &str = "📨 Pending payments";
pub(super) const BTN_EXIT_PANEL: &str = "⬅️ Exit panel";

const APPROVE_PREFIX: &str = "approve:";
const REJECT_PREFIX: &str = "reject:";

/// Keyboard for the given logical menu.
pub(super) fn keyboard_for(menu: MenuKind) -> ReplyKeyboardMarkup {
    let keyboard = match menu {
        MenuKind::Member { active: true } => vec![
            vec![
                KeyboardButton::plain(BTN_PROFILE),
                KeyboardButton::plain(BTN_CHANNEL),
            ],
            vec![
                KeyboardButton::plain(BTN_SUPPORT),
                KeyboardButton::plain(BTN_HELP),
            ],
        ],
        MenuKind::Member { active: false } => vec![
            vec![KeyboardButton::plain(BTN_BUY)],
            vec![
                KeyboardButton::plain(BTN_PROFILE),
                KeyboardButton::contact(BTN_SHARE_PHONE),
            ],
            vec![
                KeyboardButton::plain(BTN_SUPPORT),
                KeyboardButton::plain(BTN_HELP),
            ],
        ],
        MenuKind::Operator => vec![
            vec![
                KeyboardButton::plain(BTN_PENDING),
                KeyboardButton::plain(BTN_STATS),
            ],
            vec![
                KeyboardButton::plain(BTN_ACTIVATE),
                KeyboardButton::plain(BTN_DEACTIVATE),
            ],
            vec![
                KeyboardButton::plain(BTN_CHANGE_PRICE),
                KeyboardButton::plain(BTN_EXPORT),
            ],
            vec![KeyboardButton::plain(BTN_EXIT_PANEL)],
        ],
    };

    ReplyKeyboardMarkup {
        keyboard,
        resize_keyboard: true,
    }
}

/// Maps a pressed button label back to its command.
pub(super) fn command_for_label(label: &str) -> Option<MenuCommand> {
    match label {
        BTN_PROFILE => Some(MenuCommand::Profile),
        BTN_BUY => Some(MenuCommand::BuySubscription),
        BTN_CHANNEL => Some(MenuCommand::ChannelLink),
        BTN_SUPPORT => Some(MenuCommand::Support),
        BTN_HELP => Some(MenuCommand::Help),
        BTN_STATS => Some(MenuCommand::Stats),
        BTN_EXPORT => Some(MenuCommand::Export),
        BTN_CHANGE_PRICE => Some(MenuCommand::ChangePrice),
        BTN_ACTIVATE => Some(MenuCommand::Activate),
        BTN_DEACTIVATE => Some(MenuCommand::Deactivate),
        BTN_PENDING => Some(MenuCommand::PendingList),
        BTN_EXIT_PANEL => Some(MenuCommand::ExitPanel),
        _ => None,
    }
}

/// Callback data for a review choice.
pub(super) fn encode_review(action: ChoiceAction) -> Option<String> {
    match action {
        ChoiceAction::ApprovePayment(id) => Some(format!("{APPROVE_PREFIX}{id}")),
        ChoiceAction::RejectPayment(id) => Some(format!("{REJECT_PREFIX}{id}")),
        ChoiceAction::ChannelInvite => None,
    }
}

/// Decodes callback data back into a review token.
pub(super) fn decode_review(data: &str) -> Option<ChoiceToken> {
    if let Some(raw) = data.strip_prefix(APPROVE_PREFIX) {
        return raw.parse().ok().map(PaymentId::new).map(ChoiceToken::Approve);
    }
    if let Some(raw) = data.strip_prefix(REJECT_PREFIX) {
        return raw.parse().ok().map(PaymentId::new).map(ChoiceToken::Reject);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_member_button_maps_to_a_command_or_contact() {
        for row in keyboard_for(MenuKind::Member { active: false }).keyboard {
            for button in row {
                if button.request_contact {
                    continue;
                }
                assert!(
                    command_for_label(&button.text).is_some(),
                    "unmapped button {}",
                    button.text
                );
            }
        }
    }

    #[test]
    fn every_operator_button_maps_to_an_operator_command() {
        for row in keyboard_for(MenuKind::Operator).keyboard {
            for button in row {
                let cmd = command_for_label(&button.text).expect("unmapped operator button");
                assert!(cmd.requires_operator());
            }
        }
    }

    #[test]
    fn review_tokens_round_trip() {
        let approve = encode_review(ChoiceAction::ApprovePayment(PaymentId::new(41))).unwrap();
        assert_eq!(decode_review(&approve), Some(ChoiceToken::Approve(PaymentId::new(41))));

        let reject = encode_review(ChoiceAction::RejectPayment(PaymentId::new(7))).unwrap();
        assert_eq!(decode_review(&reject), Some(ChoiceToken::Reject(PaymentId::new(7))));
    }

    #[test]
    fn malformed_callback_data_is_refused() {
        assert_eq!(decode_review("approve:"), None);
        assert_eq!(decode_review("approve:abc"), None);
        assert_eq!(decode_review("unrelated"), None);
    }

    #[test]
    fn invite_action_has_no_callback_encoding() {
        assert_eq!(encode_review(ChoiceAction::ChannelInvite), None);
    }
}
