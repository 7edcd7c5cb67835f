//! Medium tier: conserves high cards by playing the lowest legal rank, but
//! flips to dumping the highest rank once anyone is close to going out.

use super::trait_def::{BotDecision, BotStrategy, RoundView};
use crate::domain::cards::Card;

pub struct MediumStrategy;

impl BotStrategy for MediumStrategy {
    fn name(&self) -> &'static str {
        "medium"
    }

    fn decide(&self, view: &RoundView) -> BotDecision {
        let legal = view.legal_cards();
        if legal.is_empty() {
            return BotDecision::pass("no legal card");
        }
        if view.is_endgame() {
            BotDecision::play(pick_highest(&legal), "endgame, shedding highest rank")
        } else {
            BotDecision::play(pick_lowest(&legal), "lowest legal rank")
        }
    }
}

/// First card with the minimal rank (ties resolved by hand order).
fn pick_lowest(legal: &[Card]) -> Card {
    let mut best = legal[0];
    for card in &legal[1..] {
        if card.rank.value() < best.rank.value() {
            best = *card;
        }
    }
    best
}

/// First card with the maximal rank (ties resolved by hand order).
pub(super) fn pick_highest(legal: &[Card]) -> Card {
    let mut best = legal[0];
    for card in &legal[1..] {
        if card.rank.value() > best.rank.value() {
            best = *card;
        }
    }
    best
}
