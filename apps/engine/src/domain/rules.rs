//! Fixed game constants and the shared play-legality rule.
//!
//! Both the round state machine and the bot decision engine go through
//! `legal_cards`, so the two can never disagree on what is playable.

use crate::domain::cards::Card;

pub const DECK_SIZE: usize = 36; // 4 suits x ranks 2..=10
pub const HAND_SIZE: usize = 5;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// A candidate beats the top of the pile when it matches the suit and has a
/// strictly higher rank.
pub fn beats(candidate: Card, top: Card) -> bool {
    candidate.suit == top.suit && candidate.rank.value() > top.rank.value()
}

/// Legality of a single card against the current pile top.
/// An empty pile accepts any card.
pub fn is_legal_play(card: Card, top: Option<Card>) -> bool {
    match top {
        None => true,
        Some(top) => beats(card, top),
    }
}

/// Filter a hand down to its legal cards, preserving hand order.
/// Hand order matters: Easy bots play the first legal card, and Hard bots
/// break score ties by hand position.
pub fn legal_cards(hand: &[Card], top: Option<Card>) -> Vec<Card> {
    hand.iter()
        .copied()
        .filter(|&c| is_legal_play(c, top))
        .collect()
}
